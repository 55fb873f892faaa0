//! Field cleaners for the known-dirty tag values
//!
//! Three value rewrites are applied while shaping: street names, postcodes
//! and phone numbers. Each cleaner owns its correction tables, taken from a
//! [`CleaningRules`] value at construction, so the cleaners stay pure and
//! can be tested against any table set.

pub mod phone;
pub mod postcode;
pub mod street;

pub use phone::PhoneCleaner;
pub use postcode::PostcodeCleaner;
pub use street::{StreetNameCleaner, StreetRule};

use crate::error::CleanError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Correction tables used by the field cleaners
///
/// `Default` holds the tables derived from auditing the Kuala Lumpur
/// extract. Deserializing from JSON overrides only the tables present in the
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleaningRules {
    /// Street-type words that are already correct
    pub canonical_street_types: Vec<String>,

    /// Abbreviations and misspellings of a leading street-type word
    pub street_corrections: BTreeMap<String, String>,

    /// Two-character estate codes that are missing their street type
    pub estate_prefixes: Vec<String>,

    /// Whole names that are missing their street type
    pub prefix_literals: Vec<String>,

    /// Street type prepended to names matched by the two lists above
    pub default_street_type: String,

    /// Whole-name replacements for one-off anomalies
    pub street_literal_fixes: BTreeMap<String, String>,

    /// Known malformed postcodes and their corrected form
    pub postcode_corrections: BTreeMap<String, String>,
}

impl Default for CleaningRules {
    fn default() -> Self {
        CleaningRules {
            canonical_street_types: strings(&[
                "Jalan",
                "Lorong",
                "Persiaran",
                "Lebuhraya",
                "Perindustrian",
                "Kampung",
                "Lebuh",
                "Changkat",
                "Tengkat",
                "Lengkok",
                "Lingkaran",
                "Pintasan",
                "Taman",
                "Apartment",
                "Desa",
                "Batu",
            ]),
            street_corrections: pairs(&[
                ("jalan", "Jalan"),
                ("Leboh", "Lebuh"),
                ("Jln", "Jalan"),
                ("Kg.", "Kampung"),
                ("Kg", "Kampung"),
                ("apartment", "Apartment"),
                ("Bt", "Batu"),
            ]),
            estate_prefixes: strings(&["SS", "PJ"]),
            prefix_literals: strings(&["P14G1", "5/109F"]),
            default_street_type: String::from("Jalan"),
            street_literal_fixes: pairs(&[("19 Persiran KLCC", "Persiaran KLCC")]),
            postcode_corrections: pairs(&[
                ("462000", "46200"),
                ("5400", "54000"),
                ("56000 ", "56000"),
                ("6800", "68000"),
            ]),
        }
    }
}

impl CleaningRules {
    /// Load rules from a JSON file; tables missing from the file keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse rules file: {}", path.display()))
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> BTreeMap<String, String> {
    items
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

/// Semantic role of a tag whose value gets cleaned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRole {
    Street,
    Postcode,
    Phone,
}

impl TagRole {
    /// Match a raw, unsplit tag key against the cleaned roles
    pub fn from_key(raw_key: &str) -> Option<Self> {
        match raw_key {
            "addr:street" => Some(TagRole::Street),
            "addr:postcode" => Some(TagRole::Postcode),
            "contact:phone" | "phone" => Some(TagRole::Phone),
            _ => None,
        }
    }
}

/// The three cleaners bundled for dispatch by [`TagRole`]
#[derive(Debug, Clone)]
pub struct FieldCleaners {
    street: StreetNameCleaner,
    postcode: PostcodeCleaner,
    phone: PhoneCleaner,
}

impl FieldCleaners {
    pub fn new(rules: &CleaningRules) -> Self {
        FieldCleaners {
            street: StreetNameCleaner::new(rules),
            postcode: PostcodeCleaner::new(rules),
            phone: PhoneCleaner,
        }
    }

    /// Clean a value according to its tag role
    pub fn clean(&self, role: TagRole, value: &str) -> Result<String, CleanError> {
        match role {
            TagRole::Street => Ok(self.street.clean(value)),
            TagRole::Postcode => Ok(self.postcode.clean(value)),
            TagRole::Phone => self.phone.clean(value),
        }
    }
}

impl Default for FieldCleaners {
    fn default() -> Self {
        FieldCleaners::new(&CleaningRules::default())
    }
}

//! Street-name canonicalization
//!
//! The leading word of a street name is its street type ("Jalan", "Lorong",
//! ...). Names are corrected by an ordered list of [`StreetRule`]s; the
//! first rule that matches decides the result.

use super::CleaningRules;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

// First run of non-whitespace, only when the name starts on a word character
static STREET_TYPE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\b\S+\.?").unwrap());

/// One correction step, evaluated in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreetRule {
    /// Leading token is already a canonical street type: keep the name
    KeepCanonical,
    /// Leading token is a known abbreviation: replace it with its canonical form
    ReplaceAbbreviation,
    /// A canonical street type appears later in the name: cut everything before it
    TruncateToCanonical,
    /// Name is a bare estate code or known literal: prepend the default street type
    PrependDefault,
    /// Name is a known one-off anomaly: replace it wholesale
    ReplaceLiteral,
}

impl StreetRule {
    /// Priority order used by [`StreetNameCleaner::new`]
    pub const DEFAULT_ORDER: [StreetRule; 5] = [
        StreetRule::KeepCanonical,
        StreetRule::ReplaceAbbreviation,
        StreetRule::TruncateToCanonical,
        StreetRule::PrependDefault,
        StreetRule::ReplaceLiteral,
    ];
}

/// Rewrites street names using injected correction tables
#[derive(Debug, Clone)]
pub struct StreetNameCleaner {
    rules: Vec<StreetRule>,
    canonical: Vec<String>,
    corrections: BTreeMap<String, String>,
    estate_prefixes: Vec<String>,
    prefix_literals: Vec<String>,
    default_street_type: String,
    literal_fixes: BTreeMap<String, String>,
}

impl StreetNameCleaner {
    pub fn new(rules: &CleaningRules) -> Self {
        Self::with_rules(rules, StreetRule::DEFAULT_ORDER.to_vec())
    }

    /// Build a cleaner with a custom rule order
    pub fn with_rules(tables: &CleaningRules, rules: Vec<StreetRule>) -> Self {
        StreetNameCleaner {
            rules,
            canonical: tables.canonical_street_types.clone(),
            corrections: tables.street_corrections.clone(),
            estate_prefixes: tables.estate_prefixes.clone(),
            prefix_literals: tables.prefix_literals.clone(),
            default_street_type: tables.default_street_type.clone(),
            literal_fixes: tables.street_literal_fixes.clone(),
        }
    }

    /// Clean a street name; names no rule matches are returned unchanged
    pub fn clean(&self, name: &str) -> String {
        let Some(token) = leading_token(name) else {
            return name.to_string();
        };

        self.rules
            .iter()
            .find_map(|rule| self.apply(*rule, name, token))
            .unwrap_or_else(|| name.to_string())
    }

    /// Apply one rule, returning `None` when it does not match
    fn apply(&self, rule: StreetRule, name: &str, token: &str) -> Option<String> {
        match rule {
            StreetRule::KeepCanonical => {
                self.is_canonical(token).then(|| name.to_string())
            }
            StreetRule::ReplaceAbbreviation => self
                .corrections
                .get(token)
                .map(|canonical| name.replacen(token, canonical, 1)),
            StreetRule::TruncateToCanonical => {
                if !self.canonical.iter().any(|word| name.contains(word.as_str())) {
                    return None;
                }
                let mut truncated = name;
                for word in &self.canonical {
                    if let Some(position) = truncated.find(word.as_str()) {
                        truncated = &truncated[position..];
                    }
                }
                Some(truncated.to_string())
            }
            StreetRule::PrependDefault => {
                let prefix: String = name.chars().take(2).collect();
                let matches = self.estate_prefixes.contains(&prefix)
                    || self.prefix_literals.iter().any(|literal| literal == name);
                matches.then(|| format!("{} {}", self.default_street_type, name))
            }
            StreetRule::ReplaceLiteral => self.literal_fixes.get(name).cloned(),
        }
    }

    fn is_canonical(&self, token: &str) -> bool {
        self.canonical.iter().any(|word| word == token)
    }
}

impl Default for StreetNameCleaner {
    fn default() -> Self {
        StreetNameCleaner::new(&CleaningRules::default())
    }
}

/// Extract the leading street-type token of a name
fn leading_token(name: &str) -> Option<&str> {
    STREET_TYPE_REGEX.find(name).map(|m| m.as_str())
}

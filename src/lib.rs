//! # osm-melt - OSM XML to relational CSV
//!
//! Melts an OpenStreetMap XML export into five CSV relations ready for bulk
//! loading: `nodes`, `nodes_tags`, `ways`, `ways_nodes` and `ways_tags`.
//! Street names, postcodes and phone numbers are cleaned on the way through.
//!
//! ## Modules
//!
//! - **source**: stream top-level entities out of the XML document
//! - **melt**: shape entities into row bundles and write them out
//! - **clean**: field cleaners and their correction tables
//! - **schema**: declared bundle schemas and the validation gate
//!
//! ## Quick Start
//!
//! ```rust
//! use osm_melt::melt::{CsvSinks, MeltConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let xml = r#"<osm>
//!   <node id="1" lat="3.15" lon="101.71" user="ali" uid="7" version="1"
//!         changeset="9" timestamp="2016-01-01T00:00:00Z">
//!     <tag k="addr:street" v="Jln Ampang"/>
//!   </node>
//! </osm>"#;
//!
//! let mut sinks = CsvSinks::in_memory()?;
//! let summary = osm_melt::process_map(xml.as_bytes(), &mut sinks, &MeltConfig::default())?;
//! assert_eq!(summary.nodes, 1);
//!
//! let outputs = sinks.into_inner()?;
//! let tags = String::from_utf8(outputs.node_tags)?;
//! assert!(tags.contains("1,street,Jalan Ampang,addr"));
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use log::info;
use std::io::{BufRead, Write};
use std::path::Path;

pub mod clean;
pub mod error;
pub mod melt;
pub mod schema;
pub mod source;

// Re-export commonly used types for convenience
pub use clean::{CleaningRules, FieldCleaners, TagRole};
pub use error::{CleanError, MeltError};
pub use melt::{Bundle, CsvSinks, ElementShaper, MeltConfig, MeltSummary, OsmMelter, OutputPaths};
pub use source::{ElementKind, OsmElement, OsmSource};

/// Entity kinds that are shaped into rows; the source discards relations
pub const MELTED_KINDS: [ElementKind; 2] = [ElementKind::Node, ElementKind::Way];

/// Main entry point: melt an OSM XML stream into the given sinks
pub fn process_map<R: BufRead, W: Write>(
    reader: R,
    sinks: &mut CsvSinks<W>,
    config: &MeltConfig,
) -> Result<MeltSummary, MeltError> {
    let melter = OsmMelter::new(config)?;
    melter.melt_all(OsmSource::with_kinds(reader, &MELTED_KINDS), sinks)
}

/// Melt an OSM XML file into the five CSV files under `output_dir`
///
/// Returns `Ok(None)` without touching anything when all five outputs
/// already exist.
pub fn process_map_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    config: &MeltConfig,
) -> Result<Option<MeltSummary>> {
    let input = input.as_ref();
    let paths = OutputPaths::in_dir(&output_dir);

    if paths.all_exist() {
        info!(
            "All outputs already exist in {}, skipping",
            output_dir.as_ref().display()
        );
        return Ok(None);
    }

    std::fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    let source = OsmSource::from_path(input, &MELTED_KINDS)
        .with_context(|| format!("Failed to open input file: {}", input.display()))?;
    let melter = OsmMelter::new(config)?;
    let mut sinks = CsvSinks::create(&paths)?;

    let summary = melter
        .melt_all(source, &mut sinks)
        .with_context(|| format!("Failed to melt {}", input.display()))?;

    info!("Melted {}: {}", input.display(), summary);
    Ok(Some(summary))
}

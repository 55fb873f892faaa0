//! OSM melting - shape map entities into relational rows
//!
//! This module turns each parsed node or way into a [`Bundle`] of rows for
//! the five output relations: the entity row itself plus its tag rows and,
//! for ways, its ordered node references.

pub mod melter;
pub mod shaper;
pub mod tags;
pub mod types;
pub mod writer;

pub use melter::OsmMelter;
pub use shaper::{ElementShaper, Shaped};
pub use types::{
    Bundle, BundleKind, MeltConfig, MeltSummary, Node, NodeBundle, TagRecord, Way, WayBundle,
    WayNode,
};
pub use writer::{CsvSinks, OutputPaths, SinkSet};

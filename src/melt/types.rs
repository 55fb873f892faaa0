use crate::clean::CleaningRules;
use serde::Serialize;
use std::fmt;

/// Header of `nodes.csv`
pub const NODE_FIELDS: [&str; 8] = ["id", "lat", "lon", "user", "uid", "version", "changeset", "timestamp"];

/// Header of `nodes_tags.csv` and `ways_tags.csv`
pub const TAG_FIELDS: [&str; 4] = ["id", "key", "value", "type"];

/// Header of `ways.csv`
pub const WAY_FIELDS: [&str; 6] = ["id", "user", "uid", "version", "changeset", "timestamp"];

/// Header of `ways_nodes.csv`
pub const WAY_NODE_FIELDS: [&str; 3] = ["id", "node_id", "position"];

/// One row of `nodes.csv`
///
/// Attribute values are copied verbatim from the document; an attribute
/// missing from the element stays `None` and is caught by validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    pub id: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub version: Option<String>,
    pub changeset: Option<String>,
    pub timestamp: Option<String>,
}

/// One row of `ways.csv`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Way {
    pub id: Option<String>,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub version: Option<String>,
    pub changeset: Option<String>,
    pub timestamp: Option<String>,
}

/// One row of `nodes_tags.csv` or `ways_tags.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRecord {
    /// Id of the owning node or way
    pub id: Option<String>,
    pub key: String,
    pub value: Option<String>,
    /// Namespace of the raw key, e.g. "addr"
    #[serde(rename = "type")]
    pub tag_type: String,
}

/// One row of `ways_nodes.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WayNode {
    /// Id of the owning way
    pub id: Option<String>,
    pub node_id: Option<String>,
    /// 0-based index of the reference within the way
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeBundle {
    pub node: Node,
    pub tags: Vec<TagRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WayBundle {
    pub way: Way,
    pub nodes: Vec<WayNode>,
    pub tags: Vec<TagRecord>,
}

/// All rows produced by one entity, validated and written as a unit
#[derive(Debug, Clone, PartialEq)]
pub enum Bundle {
    Node(NodeBundle),
    Way(WayBundle),
}

impl Bundle {
    pub fn kind(&self) -> BundleKind {
        match self {
            Bundle::Node(_) => BundleKind::Node,
            Bundle::Way(_) => BundleKind::Way,
        }
    }

    /// Id of the owning entity, for log messages
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Bundle::Node(b) => b.node.id.as_deref(),
            Bundle::Way(b) => b.way.id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleKind {
    Node,
    Way,
}

impl BundleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BundleKind::Node => "node",
            BundleKind::Way => "way",
        }
    }
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a melt run
#[derive(Debug, Clone)]
pub struct MeltConfig {
    /// Check every bundle against its schema before writing
    pub validate: bool,

    /// Tag type used for keys without a namespace
    pub default_tag_type: String,

    /// Correction tables for the field cleaners
    pub rules: CleaningRules,
}

impl Default for MeltConfig {
    fn default() -> Self {
        MeltConfig {
            validate: true,
            default_tag_type: String::from("regular"),
            rules: CleaningRules::default(),
        }
    }
}

/// Row counts and data-quality tallies for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeltSummary {
    pub nodes: usize,
    pub node_tags: usize,
    pub ways: usize,
    pub way_nodes: usize,
    pub way_tags: usize,
    /// Tags excluded for problem characters or a missing key
    pub dropped_tags: usize,
    /// Values kept raw because their cleaner rejected them
    pub cleaning_failures: usize,
}

impl MeltSummary {
    /// Count the rows of a bundle that was written
    pub fn record(&mut self, bundle: &Bundle) {
        match bundle {
            Bundle::Node(b) => {
                self.nodes += 1;
                self.node_tags += b.tags.len();
            }
            Bundle::Way(b) => {
                self.ways += 1;
                self.way_nodes += b.nodes.len();
                self.way_tags += b.tags.len();
            }
        }
    }
}

impl fmt::Display for MeltSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} tags), {} ways ({} node refs, {} tags); {} tags dropped, {} values left uncleaned",
            self.nodes,
            self.node_tags,
            self.ways,
            self.way_nodes,
            self.way_tags,
            self.dropped_tags,
            self.cleaning_failures,
        )
    }
}

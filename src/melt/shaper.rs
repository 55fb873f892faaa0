use crate::clean::{FieldCleaners, TagRole};
use crate::error::CleanError;
use crate::melt::tags::{is_exportable, split_key};
use crate::melt::types::{Bundle, MeltConfig, Node, NodeBundle, TagRecord, Way, WayBundle, WayNode};
use crate::source::{ElementKind, OsmElement, RawTag};
use log::warn;

/// A shaped bundle with the data-quality events met while shaping it
#[derive(Debug, Clone, PartialEq)]
pub struct Shaped {
    pub bundle: Bundle,

    /// Tags excluded for problem characters or a missing key
    pub dropped_tags: usize,

    /// Values kept raw because their cleaner rejected them
    pub cleaning_failures: Vec<CleanError>,
}

/// Turns parsed entities into relational bundles
///
/// The shaper holds only immutable configuration, so one instance can shape
/// any number of entities.
pub struct ElementShaper {
    cleaners: FieldCleaners,
    default_tag_type: String,
}

impl ElementShaper {
    pub fn new(config: &MeltConfig) -> Self {
        ElementShaper {
            cleaners: FieldCleaners::new(&config.rules),
            default_tag_type: config.default_tag_type.clone(),
        }
    }

    /// Shape a node or way; other kinds produce nothing
    pub fn shape(&self, element: &OsmElement) -> Option<Shaped> {
        match element.kind {
            ElementKind::Node => Some(self.shape_node(element)),
            ElementKind::Way => Some(self.shape_way(element)),
            ElementKind::Relation => None,
        }
    }

    fn shape_node(&self, element: &OsmElement) -> Shaped {
        let attr = |name: &str| element.attribute(name).map(str::to_string);
        let node = Node {
            id: attr("id"),
            lat: attr("lat"),
            lon: attr("lon"),
            user: attr("user"),
            uid: attr("uid"),
            version: attr("version"),
            changeset: attr("changeset"),
            timestamp: attr("timestamp"),
        };

        let mut shaped = Shaped {
            bundle: Bundle::Node(NodeBundle { node, tags: Vec::new() }),
            dropped_tags: 0,
            cleaning_failures: Vec::new(),
        };
        let tags = self.shape_tags(&element.tags, attr("id"), &mut shaped);
        if let Bundle::Node(ref mut bundle) = shaped.bundle {
            bundle.tags = tags;
        }
        shaped
    }

    fn shape_way(&self, element: &OsmElement) -> Shaped {
        let attr = |name: &str| element.attribute(name).map(str::to_string);
        let way = Way {
            id: attr("id"),
            user: attr("user"),
            uid: attr("uid"),
            version: attr("version"),
            changeset: attr("changeset"),
            timestamp: attr("timestamp"),
        };

        let nodes = element
            .node_refs
            .iter()
            .enumerate()
            .map(|(position, node_id)| WayNode {
                id: way.id.clone(),
                node_id: node_id.clone(),
                position,
            })
            .collect();

        let mut shaped = Shaped {
            bundle: Bundle::Way(WayBundle { way, nodes, tags: Vec::new() }),
            dropped_tags: 0,
            cleaning_failures: Vec::new(),
        };
        let tags = self.shape_tags(&element.tags, attr("id"), &mut shaped);
        if let Bundle::Way(ref mut bundle) = shaped.bundle {
            bundle.tags = tags;
        }
        shaped
    }

    /// Classify, filter and clean the tags of one entity
    fn shape_tags(
        &self,
        tags: &[RawTag],
        owner_id: Option<String>,
        shaped: &mut Shaped,
    ) -> Vec<TagRecord> {
        let mut records = Vec::with_capacity(tags.len());

        for tag in tags {
            let Some(raw_key) = tag.key.as_deref() else {
                warn!(
                    "Dropping tag without a key on {} {}",
                    shaped.bundle.kind(),
                    owner_id.as_deref().unwrap_or("?")
                );
                shaped.dropped_tags += 1;
                continue;
            };

            if !is_exportable(raw_key) {
                shaped.dropped_tags += 1;
                continue;
            }

            let (tag_type, key) = split_key(raw_key, &self.default_tag_type);
            let value = match (TagRole::from_key(raw_key), tag.value.as_deref()) {
                (Some(role), Some(raw_value)) => match self.cleaners.clean(role, raw_value) {
                    Ok(cleaned) => Some(cleaned),
                    Err(err) => {
                        warn!(
                            "Keeping raw value of {} on {} {}: {}",
                            raw_key,
                            shaped.bundle.kind(),
                            owner_id.as_deref().unwrap_or("?"),
                            err
                        );
                        shaped.cleaning_failures.push(err);
                        Some(raw_value.to_string())
                    }
                },
                (_, value) => value.map(str::to_string),
            };

            records.push(TagRecord {
                id: owner_id.clone(),
                key: key.to_string(),
                value,
                tag_type: tag_type.to_string(),
            });
        }

        records
    }
}

impl Default for ElementShaper {
    fn default() -> Self {
        ElementShaper::new(&MeltConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn element(kind: ElementKind, attrs: &[(&str, &str)], tags: &[(&str, &str)]) -> OsmElement {
        let mut element = OsmElement::new(kind);
        element.attributes = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        element.tags = tags
            .iter()
            .map(|(k, v)| RawTag {
                key: Some(k.to_string()),
                value: Some(v.to_string()),
            })
            .collect();
        element
    }

    fn node_attrs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("id", "42"),
            ("lat", "3.1478"),
            ("lon", "101.6953"),
            ("user", "alice"),
            ("uid", "7"),
            ("version", "2"),
            ("changeset", "1234"),
            ("timestamp", "2016-05-01T10:00:00Z"),
        ]
    }

    #[test]
    fn test_node_attributes_and_tags() {
        let input = element(
            ElementKind::Node,
            &node_attrs(),
            &[("amenity", "restaurant"), ("addr:street", "Jln Ampang"), ("phone", "03-22601234")],
        );

        let shaped = ElementShaper::default().shape(&input).unwrap();
        let Bundle::Node(bundle) = shaped.bundle else {
            panic!("Expected node bundle");
        };

        assert_eq!(bundle.node.id.as_deref(), Some("42"));
        assert_eq!(bundle.node.lat.as_deref(), Some("3.1478"));
        assert_eq!(bundle.node.timestamp.as_deref(), Some("2016-05-01T10:00:00Z"));

        assert_eq!(bundle.tags.len(), 3);
        assert_eq!(
            bundle.tags[0],
            TagRecord {
                id: Some("42".to_string()),
                key: "amenity".to_string(),
                value: Some("restaurant".to_string()),
                tag_type: "regular".to_string(),
            }
        );
        assert_eq!(bundle.tags[1].key, "street");
        assert_eq!(bundle.tags[1].tag_type, "addr");
        assert_eq!(bundle.tags[1].value.as_deref(), Some("Jalan Ampang"));
        assert_eq!(bundle.tags[2].value.as_deref(), Some("+60322601234"));
        assert_eq!(shaped.dropped_tags, 0);
        assert!(shaped.cleaning_failures.is_empty());
    }

    #[test]
    fn test_problem_keys_are_dropped() {
        let input = element(
            ElementKind::Node,
            &node_attrs(),
            &[("name", "KLCC"), ("fixme.note", "x"), ("bad key", "y"), ("a=b", "z")],
        );

        let shaped = ElementShaper::default().shape(&input).unwrap();
        let Bundle::Node(bundle) = shaped.bundle else {
            panic!("Expected node bundle");
        };

        assert_eq!(bundle.tags.len(), 1);
        assert_eq!(bundle.tags[0].key, "name");
        assert_eq!(shaped.dropped_tags, 3);
    }

    #[test]
    fn test_cleaning_uses_raw_key_only() {
        // "street" without the addr namespace is not a street-name tag
        let input = element(
            ElementKind::Node,
            &node_attrs(),
            &[("street", "Jln Ampang"), ("contact:phone", "03-22601234"), ("addr:postcode", "462000")],
        );

        let Bundle::Node(bundle) = ElementShaper::default().shape(&input).unwrap().bundle else {
            panic!("Expected node bundle");
        };

        assert_eq!(bundle.tags[0].value.as_deref(), Some("Jln Ampang"));
        assert_eq!(bundle.tags[1].tag_type, "contact");
        assert_eq!(bundle.tags[1].value.as_deref(), Some("+60322601234"));
        assert_eq!(bundle.tags[2].value.as_deref(), Some("46200"));
    }

    #[test]
    fn test_malformed_phone_is_kept_raw() {
        let input = element(ElementKind::Node, &node_attrs(), &[("phone", "0")]);

        let shaped = ElementShaper::default().shape(&input).unwrap();
        assert_eq!(shaped.cleaning_failures.len(), 1);

        let Bundle::Node(bundle) = shaped.bundle else {
            panic!("Expected node bundle");
        };
        assert_eq!(bundle.tags[0].value.as_deref(), Some("0"));
    }

    #[test]
    fn test_way_nodes_keep_input_order() {
        let mut input = element(
            ElementKind::Way,
            &[("id", "100"), ("user", "bob"), ("uid", "8"), ("version", "1"), ("changeset", "5"), ("timestamp", "t")],
            &[("addr:street", "Kg. Baru")],
        );
        input.node_refs = ["30", "10", "20", "10"]
            .iter()
            .map(|r| Some(r.to_string()))
            .collect();

        let Bundle::Way(bundle) = ElementShaper::default().shape(&input).unwrap().bundle else {
            panic!("Expected way bundle");
        };

        let refs: Vec<(usize, &str)> = bundle
            .nodes
            .iter()
            .map(|n| (n.position, n.node_id.as_deref().unwrap()))
            .collect();
        assert_eq!(refs, vec![(0, "30"), (1, "10"), (2, "20"), (3, "10")]);
        assert!(bundle.nodes.iter().all(|n| n.id.as_deref() == Some("100")));

        assert_eq!(bundle.tags[0].id.as_deref(), Some("100"));
        assert_eq!(bundle.tags[0].value.as_deref(), Some("Kampung Baru"));
    }

    #[test]
    fn test_relations_are_not_shaped() {
        let input = element(ElementKind::Relation, &[("id", "9")], &[("type", "route")]);
        assert!(ElementShaper::default().shape(&input).is_none());
    }

    #[test]
    fn test_missing_attributes_and_keys() {
        let mut input = element(ElementKind::Node, &[("id", "1")], &[]);
        input.tags.push(RawTag { key: None, value: Some("orphan".to_string()) });
        input.tags.push(RawTag { key: Some("note".to_string()), value: None });

        let shaped = ElementShaper::default().shape(&input).unwrap();
        assert_eq!(shaped.dropped_tags, 1);

        let Bundle::Node(bundle) = shaped.bundle else {
            panic!("Expected node bundle");
        };
        assert_eq!(bundle.node.lat, None);
        assert_eq!(bundle.tags.len(), 1);
        assert_eq!(bundle.tags[0].value, None);
    }
}

//! Streaming reader for OSM XML exports
//!
//! [`OsmSource`] pulls events from a [`quick_xml::Reader`] and yields one
//! top-level entity at a time. Only the entity being assembled is held in
//! memory: the event buffer is cleared after every event and a finished
//! entity is moved out to the caller, so nothing of it remains in the
//! source once it has been yielded.

use crate::error::MeltError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Kind of a top-level entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl ElementKind {
    /// Every kind the source understands
    pub const ALL: [ElementKind; 3] = [ElementKind::Node, ElementKind::Way, ElementKind::Relation];

    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"node" => Some(ElementKind::Node),
            b"way" => Some(ElementKind::Way),
            b"relation" => Some(ElementKind::Relation),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
            ElementKind::Relation => "relation",
        }
    }
}

/// A `<tag k=".." v=".."/>` child as found in the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTag {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// A fully read top-level entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsmElement {
    pub kind: ElementKind,
    pub attributes: HashMap<String, String>,
    pub tags: Vec<RawTag>,
    /// `ref` of each `<nd>` child, in document order
    pub node_refs: Vec<Option<String>>,
}

impl OsmElement {
    pub fn new(kind: ElementKind) -> Self {
        OsmElement {
            kind,
            attributes: HashMap::new(),
            tags: Vec::new(),
            node_refs: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn from_start(kind: ElementKind, start: &BytesStart) -> Result<Self, quick_xml::Error> {
        let mut element = OsmElement::new(kind);
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.attributes.insert(key, value);
        }
        Ok(element)
    }

    fn add_child(&mut self, child: &BytesStart) -> Result<(), quick_xml::Error> {
        match child.name().as_ref() {
            b"tag" => self.tags.push(RawTag {
                key: get_attr_value(child, b"k")?,
                value: get_attr_value(child, b"v")?,
            }),
            b"nd" => self.node_refs.push(get_attr_value(child, b"ref")?),
            _ => {}
        }
        Ok(())
    }
}

fn get_attr_value(element: &BytesStart, name: &[u8]) -> Result<Option<String>, quick_xml::Error> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn select(kinds: &[ElementKind], name: &[u8]) -> Option<ElementKind> {
    ElementKind::from_name(name).filter(|kind| kinds.contains(kind))
}

/// Lazy, non-restartable sequence of top-level entities
///
/// Entities of kinds outside the selection are read and discarded. The
/// first parse error is yielded once and ends the sequence.
pub struct OsmSource<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    kinds: Vec<ElementKind>,
    /// Names of the currently open elements, root first
    open: Vec<String>,
    finished: bool,
}

impl OsmSource<BufReader<File>> {
    /// Open a file, reading only the given entity kinds
    pub fn from_path<P: AsRef<Path>>(path: P, kinds: &[ElementKind]) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(OsmSource::with_kinds(BufReader::new(file), kinds))
    }
}

impl<R: BufRead> OsmSource<R> {
    /// Read nodes, ways and relations
    pub fn new(reader: R) -> Self {
        Self::with_kinds(reader, &ElementKind::ALL)
    }

    /// Read only the given entity kinds
    pub fn with_kinds(reader: R, kinds: &[ElementKind]) -> Self {
        OsmSource {
            reader: Reader::from_reader(reader),
            buf: Vec::new(),
            kinds: kinds.to_vec(),
            open: Vec::new(),
            finished: false,
        }
    }

    /// Advance to the next selected entity
    fn read_element(&mut self) -> Result<Option<OsmElement>, MeltError> {
        let mut current: Option<OsmElement> = None;

        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(source) => {
                    return Err(MeltError::Parse {
                        position: self.reader.buffer_position(),
                        source,
                    })
                }
            };
            let parse_error = |source| MeltError::Parse {
                position: self.reader.buffer_position(),
                source,
            };

            match event {
                Event::Start(e) => {
                    if self.open.len() == 1 {
                        if let Some(kind) = select(&self.kinds, e.name().as_ref()) {
                            current = Some(OsmElement::from_start(kind, &e).map_err(parse_error)?);
                        }
                    } else if self.open.len() == 2 {
                        if let Some(element) = current.as_mut() {
                            element.add_child(&e).map_err(parse_error)?;
                        }
                    }
                    self.open
                        .push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
                Event::Empty(e) => {
                    if self.open.len() == 1 {
                        if let Some(kind) = select(&self.kinds, e.name().as_ref()) {
                            return OsmElement::from_start(kind, &e)
                                .map(Some)
                                .map_err(parse_error);
                        }
                    } else if self.open.len() == 2 {
                        if let Some(element) = current.as_mut() {
                            element.add_child(&e).map_err(parse_error)?;
                        }
                    }
                }
                Event::End(_) => {
                    self.open.pop();
                    if self.open.len() == 1 && current.is_some() {
                        return Ok(current.take());
                    }
                }
                Event::Eof => {
                    return match self.open.pop() {
                        Some(name) => Err(MeltError::UnexpectedEof(name)),
                        None => Ok(None),
                    };
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for OsmSource<R> {
    type Item = Result<OsmElement, MeltError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_element() {
            Ok(Some(element)) => Some(Ok(element)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <bounds minlat="3.1" minlon="101.6" maxlat="3.2" maxlon="101.7"/>
  <node id="1" lat="3.15" lon="101.71" user="alice" uid="7" version="2" changeset="99" timestamp="2016-01-01T00:00:00Z">
    <tag k="amenity" v="cafe"/>
    <tag k="phone" v="03-22601234"/>
  </node>
  <node id="2" lat="3.16" lon="101.72" user="bob" uid="8" version="1" changeset="100" timestamp="2016-01-02T00:00:00Z"/>
  <way id="10" user="alice" uid="7" version="3" changeset="101" timestamp="2016-01-03T00:00:00Z">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="highway" v="residential"/>
  </way>
  <relation id="20" user="carol" uid="9" version="1" changeset="102" timestamp="2016-01-04T00:00:00Z">
    <member type="way" ref="10" role="outer"/>
    <tag k="type" v="multipolygon"/>
  </relation>
</osm>"#;

    fn read_all(xml: &str, kinds: &[ElementKind]) -> Vec<Result<OsmElement, MeltError>> {
        OsmSource::with_kinds(xml.as_bytes(), kinds).collect()
    }

    #[test]
    fn test_yields_top_level_entities_in_order() {
        let elements: Vec<OsmElement> = OsmSource::new(SAMPLE.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();

        let kinds: Vec<ElementKind> = elements.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![ElementKind::Node, ElementKind::Node, ElementKind::Way, ElementKind::Relation]
        );

        let node = &elements[0];
        assert_eq!(node.attribute("id"), Some("1"));
        assert_eq!(node.attribute("user"), Some("alice"));
        assert_eq!(node.tags.len(), 2);
        assert_eq!(node.tags[1].key.as_deref(), Some("phone"));
        assert_eq!(node.tags[1].value.as_deref(), Some("03-22601234"));

        // self-closing entity has no children
        assert!(elements[1].tags.is_empty());

        let way = &elements[2];
        assert_eq!(
            way.node_refs,
            vec![Some("1".to_string()), Some("2".to_string())]
        );
        assert_eq!(way.tags[0].key.as_deref(), Some("highway"));
    }

    #[test]
    fn test_kind_selection() {
        let elements = read_all(SAMPLE, &[ElementKind::Way]);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].as_ref().unwrap().attribute("id"), Some("10"));
    }

    #[test]
    fn test_escaped_attribute_values() {
        let xml = r#"<osm><node id="1"><tag k="name" v="A &amp; W"/></node></osm>"#;
        let elements = read_all(xml, &ElementKind::ALL);
        let node = elements[0].as_ref().unwrap();
        assert_eq!(node.tags[0].value.as_deref(), Some("A & W"));
    }

    #[test]
    fn test_missing_tag_attributes_are_kept_as_none() {
        let xml = r#"<osm><way id="5"><nd/><tag v="x"/></way></osm>"#;
        let elements = read_all(xml, &ElementKind::ALL);
        let way = elements[0].as_ref().unwrap();
        assert_eq!(way.node_refs, vec![None]);
        assert_eq!(way.tags[0], RawTag { key: None, value: Some("x".to_string()) });
    }

    #[test]
    fn test_mismatched_end_tag_is_fatal() {
        let xml = r#"<osm><node id="1"></way><node id="2"/></osm>"#;
        let results = read_all(xml, &ElementKind::ALL);
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(MeltError::Parse { .. })));
    }

    #[test]
    fn test_truncated_document_is_fatal() {
        let xml = r#"<osm><node id="1"/><way id="2"><nd ref="1"/>"#;
        let results = read_all(xml, &ElementKind::ALL);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_empty_root() {
        assert!(read_all("<osm/>", &ElementKind::ALL).is_empty());
        assert!(read_all("<osm></osm>", &ElementKind::ALL).is_empty());
    }
}

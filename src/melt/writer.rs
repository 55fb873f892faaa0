use crate::error::MeltError;
use crate::melt::types::{Bundle, NODE_FIELDS, TAG_FIELDS, WAY_FIELDS, WAY_NODE_FIELDS};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Locations of the five output relations within one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub nodes: PathBuf,
    pub node_tags: PathBuf,
    pub ways: PathBuf,
    pub way_nodes: PathBuf,
    pub way_tags: PathBuf,
}

impl OutputPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        OutputPaths {
            nodes: dir.join("nodes.csv"),
            node_tags: dir.join("nodes_tags.csv"),
            ways: dir.join("ways.csv"),
            way_nodes: dir.join("ways_nodes.csv"),
            way_tags: dir.join("ways_tags.csv"),
        }
    }

    pub fn all(&self) -> [&Path; 5] {
        [
            self.nodes.as_path(),
            self.node_tags.as_path(),
            self.ways.as_path(),
            self.way_nodes.as_path(),
            self.way_tags.as_path(),
        ]
    }

    /// Whether every output file is already present
    pub fn all_exist(&self) -> bool {
        self.all().iter().all(|path| path.is_file())
    }
}

/// The underlying outputs of a [`CsvSinks`], one per relation
#[derive(Debug)]
pub struct SinkSet<W> {
    pub nodes: W,
    pub node_tags: W,
    pub ways: W,
    pub way_nodes: W,
    pub way_tags: W,
}

/// Writes bundles to the five relational CSV outputs
///
/// Every output starts with its header row, written at construction, so an
/// empty relation still carries its column names.
pub struct CsvSinks<W: Write> {
    nodes: csv::Writer<W>,
    node_tags: csv::Writer<W>,
    ways: csv::Writer<W>,
    way_nodes: csv::Writer<W>,
    way_tags: csv::Writer<W>,
}

impl CsvSinks<File> {
    /// Create (or truncate) the output files and write their headers
    pub fn create(paths: &OutputPaths) -> Result<Self> {
        let open = |path: &Path| {
            File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))
        };

        let sinks = CsvSinks::new(SinkSet {
            nodes: open(&paths.nodes)?,
            node_tags: open(&paths.node_tags)?,
            ways: open(&paths.ways)?,
            way_nodes: open(&paths.way_nodes)?,
            way_tags: open(&paths.way_tags)?,
        })
        .context("Failed to write CSV headers")?;
        Ok(sinks)
    }
}

impl<W: Write> CsvSinks<W> {
    pub fn new(outputs: SinkSet<W>) -> Result<Self, MeltError> {
        Ok(CsvSinks {
            nodes: with_header(outputs.nodes, &NODE_FIELDS)?,
            node_tags: with_header(outputs.node_tags, &TAG_FIELDS)?,
            ways: with_header(outputs.ways, &WAY_FIELDS)?,
            way_nodes: with_header(outputs.way_nodes, &WAY_NODE_FIELDS)?,
            way_tags: with_header(outputs.way_tags, &TAG_FIELDS)?,
        })
    }

    /// Append every row of a bundle to its relation
    pub fn write_bundle(&mut self, bundle: &Bundle) -> Result<(), MeltError> {
        match bundle {
            Bundle::Node(b) => {
                self.nodes.serialize(&b.node)?;
                for tag in &b.tags {
                    self.node_tags.serialize(tag)?;
                }
            }
            Bundle::Way(b) => {
                self.ways.serialize(&b.way)?;
                for node in &b.nodes {
                    self.way_nodes.serialize(node)?;
                }
                for tag in &b.tags {
                    self.way_tags.serialize(tag)?;
                }
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), MeltError> {
        self.nodes.flush()?;
        self.node_tags.flush()?;
        self.ways.flush()?;
        self.way_nodes.flush()?;
        self.way_tags.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying outputs
    pub fn into_inner(self) -> Result<SinkSet<W>, MeltError> {
        Ok(SinkSet {
            nodes: unwrap_writer(self.nodes)?,
            node_tags: unwrap_writer(self.node_tags)?,
            ways: unwrap_writer(self.ways)?,
            way_nodes: unwrap_writer(self.way_nodes)?,
            way_tags: unwrap_writer(self.way_tags)?,
        })
    }
}

impl CsvSinks<Vec<u8>> {
    pub fn in_memory() -> Result<Self, MeltError> {
        CsvSinks::new(SinkSet {
            nodes: Vec::new(),
            node_tags: Vec::new(),
            ways: Vec::new(),
            way_nodes: Vec::new(),
            way_tags: Vec::new(),
        })
    }
}

fn with_header<W: Write>(output: W, header: &[&str]) -> Result<csv::Writer<W>, MeltError> {
    // rows are serialized positionally under this header
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    writer.write_record(header)?;
    Ok(writer)
}

fn unwrap_writer<W: Write>(writer: csv::Writer<W>) -> Result<W, MeltError> {
    writer
        .into_inner()
        .map_err(|err| MeltError::Io(err.into_error()))
}

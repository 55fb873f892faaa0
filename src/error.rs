use crate::melt::types::BundleKind;
use thiserror::Error;

/// Fatal errors raised while melting a map export
#[derive(Debug, Error)]
pub enum MeltError {
    /// The input is not well-formed XML
    #[error("malformed document at byte {position}: {source}")]
    Parse {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    /// The input ended while an element was still open
    #[error("document ended inside an open <{0}> element")]
    UnexpectedEof(String),

    /// A built-in bundle schema failed to compile
    #[error("failed to compile {kind} schema: {message}")]
    SchemaCompile { kind: BundleKind, message: String },

    /// A shaped bundle does not match its declared schema
    #[error("element of type '{kind}' has the following errors:\n{}", .errors.join("\n"))]
    Validation { kind: BundleKind, errors: Vec<String> },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by a single field cleaner
///
/// These never abort a run: the shaper keeps the raw value and reports the
/// failure in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanError {
    #[error("malformed phone number {raw:?}: {reason}")]
    MalformedPhone { raw: String, reason: &'static str },
}

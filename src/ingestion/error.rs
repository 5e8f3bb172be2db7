//! Error taxonomy for the ingestion pipeline

use thiserror::Error;

/// The input bytes are not a well-formed XML document
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("{0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("invalid attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("unclosed element <{0}> at end of document")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,
    #[error("text outside the root element")]
    TextOutsideRoot,
}

/// The persistence collaborator failed
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed XML: {0}")]
    Parse(#[from] XmlError),

    #[error("missing required node {path}")]
    Extraction { path: String },

    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl IngestError {
    pub fn missing(path: impl Into<String>) -> Self {
        IngestError::Extraction { path: path.into() }
    }

    /// Stable kind tag reported to API callers
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Parse(_) => "parse",
            IngestError::Extraction { .. } => "extraction",
            IngestError::Persistence(_) => "persistence",
        }
    }

    /// True when the input document is at fault rather than the store
    pub fn is_input_error(&self) -> bool {
        !matches!(self, IngestError::Persistence(_))
    }
}

use thiserror::Error;

/// Core error type shared across the MQA crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The serialized catalog could not be parsed into the graph.
    #[error("failed to load graph: {0}")]
    Load(String),
    /// The in-memory store failed.
    #[error("storage error: {0}")]
    Storage(String),
    /// A graph query was malformed or failed during evaluation.
    #[error("query error: {0}")]
    Query(String),
    /// The graph could not be written out.
    #[error("serialization error: {0}")]
    Serialize(String),
    /// No RDF syntax is known for the given media type or extension.
    #[error("unsupported RDF format: {0}")]
    UnsupportedFormat(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results returned by the MQA crates.
pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Errors raised while retrieving a catalog.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("graph error: {0}")]
    Graph(#[from] mqa_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid url '{0}'")]
    InvalidUrl(String),
    #[error("unexpected response from {url}: {message}")]
    Payload { url: String, message: String },
}

pub type Result<T> = std::result::Result<T, FetchError>;

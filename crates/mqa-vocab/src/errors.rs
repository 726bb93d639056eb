use thiserror::Error;

/// Errors raised while loading or refreshing vocabularies.
#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("graph error: {0}")]
    Graph(#[from] mqa_core::Error),
    #[error("xml error: {0}")]
    Xml(String),
    #[error("vocabulary '{0}' is not available")]
    MissingSource(String),
}

pub type Result<T> = std::result::Result<T, VocabularyError>;

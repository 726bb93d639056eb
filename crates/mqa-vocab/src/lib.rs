//! Controlled vocabularies used by the MQA format, licence and access-right indicators.

pub mod errors;
pub mod provider;
pub mod refresh;
pub mod source;

pub use errors::{Result, VocabularyError};
pub use provider::{CsvVocabularyProvider, StaticVocabularyProvider, VocabularyProvider};
pub use refresh::{
    REMOTE_VOCABULARIES, RefreshOptions, RefreshSummary, RemoteKind, RemoteVocabulary,
    refresh_vocabularies,
};
pub use source::VocabularySource;

use std::time::Duration;

use mqa_core::RdfFormat;

/// Options that control how a catalog is retrieved.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub url: String,
    /// Syntax of each page body.
    pub format: RdfFormat,
    pub timeout: Duration,
    pub user_agent: String,
    /// Stop after this many pages even if the collection claims more.
    pub max_pages: Option<u32>,
}

impl FetchOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            format: RdfFormat::RdfXml,
            timeout: Duration::from_secs(60),
            user_agent: format!("mqa/{}", env!("CARGO_PKG_VERSION")),
            max_pages: None,
        }
    }
}

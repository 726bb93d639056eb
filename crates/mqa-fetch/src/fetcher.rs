use async_trait::async_trait;

use mqa_core::CatalogGraph;

use crate::errors::Result;
use crate::options::FetchOptions;

/// Trait implemented by catalog sources that produce a parsed graph.
#[async_trait]
pub trait CatalogFetcher {
    /// Returns the fetcher identifier (e.g. `hydra`).
    fn kind(&self) -> &'static str;

    /// Retrieve every page of the catalog into one graph.
    async fn fetch(&self, opts: &FetchOptions) -> Result<CatalogGraph>;
}

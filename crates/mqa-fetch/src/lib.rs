//! Catalog retrieval: paginated HTTP endpoints and local files.

pub mod errors;
pub mod fetcher;
pub mod file;
pub mod hydra;
pub mod options;

pub use errors::{FetchError, Result};
pub use fetcher::CatalogFetcher;
pub use file::load_catalog_file;
pub use hydra::{CkanSearchFetcher, HydraFetcher, page_url};
pub use options::FetchOptions;

pub use mqa_core::CatalogGraph;

//! Core contracts and helpers for metadata quality evaluation.
//!
//! This crate wraps the catalog RDF graph behind a small query facade and
//! defines the namespaces and catalog flavours shared by the fetcher, the
//! vocabulary provider, the evaluation engine and the CLI.

pub mod catalog;
pub mod error;
pub mod graph;
pub mod namespaces;

pub use catalog::{CatalogType, DATASET, DISTRIBUTION, last_path_segment};
pub use error::{Error, Result};
pub use graph::{CatalogGraph, RdfFormat, ValueCount, format_from_media_type, format_from_path};

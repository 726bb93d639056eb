use std::path::Path;

use mqa_core::{CatalogGraph, Error, format_from_media_type};
use tracing::info;

use crate::errors::Result;

/// Parse a catalog file. `media_type` wins over the file extension.
pub fn load_catalog_file(path: &Path, media_type: Option<&str>) -> Result<CatalogGraph> {
    let format = match media_type {
        Some(media_type) => Some(
            format_from_media_type(media_type)
                .ok_or_else(|| Error::UnsupportedFormat(media_type.to_string()))?,
        ),
        None => None,
    };
    let graph = CatalogGraph::from_path(path, format)?;
    info!(path = %path.display(), triples = graph.len()?, "catalog file loaded");
    Ok(graph)
}

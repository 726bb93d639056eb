use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// RDF type of the dataset population.
pub const DATASET: &str = "dcat:Dataset";
/// RDF type of the distribution population.
pub const DISTRIBUTION: &str = "dcat:Distribution";

/// Flavour of catalog exporter that produced the graph.
///
/// Exporters disagree on how formats are written (full vocabulary URIs,
/// bare labels, or a labelled format resource), so the catalog type selects
/// both the vocabulary column and the matching rule for format indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogType {
    /// CKAN DCAT export writing format labels (`CSV`, `JSON`).
    Ckan,
    /// CKAN (GeoDCAT-AP) export writing vocabulary URIs.
    #[default]
    CkanUris,
    /// European Data Portal search export.
    Edp,
    /// Spanish NTI-RISP catalogs: `dct:format` points at a `dct:IMT` with an `rdfs:label`.
    Nti,
}

impl CatalogType {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogType::Ckan => "ckan",
            CatalogType::CkanUris => "ckan_uris",
            CatalogType::Edp => "edp",
            CatalogType::Nti => "nti",
        }
    }
}

impl fmt::Display for CatalogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "ckan" => Ok(CatalogType::Ckan),
            "ckan_uris" => Ok(CatalogType::CkanUris),
            "edp" => Ok(CatalogType::Edp),
            "nti" => Ok(CatalogType::Nti),
            other => Err(format!(
                "unknown catalog type '{other}' (expected ckan, ckan_uris, edp or nti)"
            )),
        }
    }
}

/// Last `/`-separated segment of a trimmed IRI or label.
///
/// `http://publications.europa.eu/resource/authority/file-type/XML` yields `XML`;
/// a value without slashes is returned unchanged.
pub fn last_path_segment(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_types() {
        assert_eq!("ckan".parse::<CatalogType>(), Ok(CatalogType::Ckan));
        assert_eq!("CKAN_URIS".parse::<CatalogType>(), Ok(CatalogType::CkanUris));
        assert_eq!(" edp ".parse::<CatalogType>(), Ok(CatalogType::Edp));
        assert_eq!("nti".parse::<CatalogType>(), Ok(CatalogType::Nti));
        assert!("dcat".parse::<CatalogType>().is_err());
    }

    #[test]
    fn last_segment_of_uris_and_labels() {
        assert_eq!(
            last_path_segment("http://publications.europa.eu/resource/authority/file-type/XML"),
            "XML"
        );
        assert_eq!(last_path_segment(" text/csv "), "csv");
        assert_eq!(last_path_segment("CSV"), "CSV");
        assert_eq!(last_path_segment("http://example.org/formats/"), "");
    }
}

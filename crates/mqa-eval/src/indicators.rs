//! Declarative indicator table.
//!
//! The table is data: each descriptor names the counting strategy that
//! produces its count, and table order is report order. The built-in MQA
//! table can be replaced by a TOML document of `[[indicator]]` entries.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use mqa_core::{DATASET, DISTRIBUTION};
use mqa_vocab::VocabularySource;
use serde::{Deserialize, Serialize};

use crate::errors::{EvalError, IssueTarget, Result, ValidationIssue, ValidationReport};
use crate::matching::MatchingStrategy;

const CODE_200: &str = " code=200";
const FROM_VOCABULARY: &str = " from vocabulary";

/// Quality dimension an indicator contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Findability,
    Accessibility,
    Interoperability,
    Reusability,
    Contextuality,
}

impl Dimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Findability => "Findability",
            Dimension::Accessibility => "Accessibility",
            Dimension::Interoperability => "Interoperability",
            Dimension::Reusability => "Reusability",
            Dimension::Contextuality => "Contextuality",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denominator of an indicator's coverage ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    #[serde(alias = "datasetCount")]
    Datasets,
    #[serde(alias = "distributionCount")]
    Distributions,
}

/// One property path, or several for multi-property vocabulary indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyPath {
    Single(String),
    Multiple(Vec<String>),
}

impl PropertyPath {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            PropertyPath::Single(path) => vec![path.as_str()],
            PropertyPath::Multiple(paths) => paths.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, PropertyPath::Multiple(_))
    }

    /// Paths joined with `/`, as shown in the report.
    pub fn joined(&self) -> String {
        self.paths().join("/")
    }
}

impl From<&str> for PropertyPath {
    fn from(value: &str) -> Self {
        PropertyPath::Single(value.to_string())
    }
}

/// Closed set of counting strategies an indicator can use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CountingStrategy {
    /// Resources of the entity type with at least one value for the property.
    EntityProperty,
    /// Resource occurrences whose property value answers HTTP 2xx/3xx.
    ReachableUrls,
    /// Format compliance whose column and matching follow the catalog type.
    /// One source per property path; counts are summed.
    CatalogVocabulary { sources: Vec<VocabularySource> },
    /// Vocabulary compliance with a fixed column and matching.
    FixedVocabulary {
        source: VocabularySource,
        #[serde(default)]
        column: usize,
        matching: MatchingStrategy,
    },
    /// Population if the catalog conforms to the SHACL shapes, else 0.
    ShaclConformance,
}

impl CountingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            CountingStrategy::EntityProperty => "entity_property",
            CountingStrategy::ReachableUrls => "reachable_urls",
            CountingStrategy::CatalogVocabulary { .. } => "catalog_vocabulary",
            CountingStrategy::FixedVocabulary { .. } => "fixed_vocabulary",
            CountingStrategy::ShaclConformance => "shacl_conformance",
        }
    }

    fn label_suffix(&self) -> &'static str {
        match self {
            CountingStrategy::ReachableUrls => CODE_200,
            CountingStrategy::CatalogVocabulary { .. } | CountingStrategy::FixedVocabulary { .. } => {
                FROM_VOCABULARY
            }
            CountingStrategy::EntityProperty | CountingStrategy::ShaclConformance => "",
        }
    }
}

/// A single measurable rule and how to count it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorDescriptor {
    pub key: String,
    pub dimension: Dimension,
    pub entity_type: String,
    pub property: PropertyPath,
    pub population: Population,
    pub weight: u32,
    #[serde(flatten)]
    pub strategy: CountingStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl IndicatorDescriptor {
    pub fn new(
        key: impl Into<String>,
        dimension: Dimension,
        entity_type: &str,
        property: PropertyPath,
        population: Population,
        weight: u32,
        strategy: CountingStrategy,
    ) -> Self {
        Self {
            key: key.into(),
            dimension,
            entity_type: entity_type.to_string(),
            property,
            population,
            weight,
            strategy,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Report label: the explicit label, or the property followed by the strategy suffix.
    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{}{}", self.property.joined(), self.strategy.label_suffix()),
        }
    }
}

/// Ordered indicator descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorTable {
    #[serde(rename = "indicator", default)]
    indicators: Vec<IndicatorDescriptor>,
}

impl IndicatorTable {
    pub fn new(indicators: Vec<IndicatorDescriptor>) -> Self {
        Self { indicators }
    }

    /// The MQA indicator battery in report order. Weights sum to 405.
    pub fn default_mqa() -> Self {
        use CountingStrategy::*;
        use Dimension::*;
        use Population::*;

        let property = |key, dimension, entity, path: &str, population, weight| {
            IndicatorDescriptor::new(key, dimension, entity, path.into(), population, weight, EntityProperty)
        };
        let reachable = |key, path: &str, weight| {
            IndicatorDescriptor::new(
                key,
                Accessibility,
                DISTRIBUTION,
                path.into(),
                Distributions,
                weight,
                ReachableUrls,
            )
        };
        let format_vocabulary = |key, source| {
            IndicatorDescriptor::new(
                key,
                Interoperability,
                DISTRIBUTION,
                "dct:format".into(),
                Distributions,
                20,
                CatalogVocabulary {
                    sources: vec![source],
                },
            )
        };

        Self::new(vec![
            property("findability_keywords_available", Findability, DATASET, "dcat:keyword", Datasets, 30),
            property("findability_category_available", Findability, DATASET, "dcat:theme", Datasets, 30),
            property("findability_spatial_available", Findability, DATASET, "dct:spatial", Datasets, 20),
            property("findability_temporal_available", Findability, DATASET, "dct:temporal", Datasets, 20),
            reachable("accessibility_access_url_code_200", "dcat:accessURL", 50),
            property(
                "accessibility_download_url_available",
                Accessibility,
                DISTRIBUTION,
                "dcat:downloadURL",
                Distributions,
                20,
            ),
            reachable("accessibility_download_url_code_200", "dcat:downloadURL", 30),
            property(
                "interoperability_format_available",
                Interoperability,
                DISTRIBUTION,
                "dct:format",
                Distributions,
                20,
            ),
            property(
                "interoperability_media_type_available",
                Interoperability,
                DISTRIBUTION,
                "dcat:mediaType",
                Distributions,
                10,
            ),
            IndicatorDescriptor::new(
                "interoperability_format_media_type_from_vocabulary",
                Interoperability,
                DISTRIBUTION,
                PropertyPath::Multiple(vec!["dct:format".to_string(), "dcat:mediaType".to_string()]),
                Distributions,
                10,
                CatalogVocabulary {
                    sources: vec![VocabularySource::FileTypes, VocabularySource::MediaTypes],
                },
            ),
            format_vocabulary(
                "interoperability_format_non_proprietary",
                VocabularySource::NonProprietary,
            )
            .with_label("dct:format non-proprietary"),
            format_vocabulary(
                "interoperability_format_machine_readable",
                VocabularySource::MachineReadable,
            )
            .with_label("dct:format machine-readable"),
            IndicatorDescriptor::new(
                "interoperability_dcat_ap_compliance",
                Interoperability,
                DATASET,
                "DCAT-AP compliance".into(),
                Datasets,
                30,
                ShaclConformance,
            ),
            property(
                "reusability_license_available",
                Reusability,
                DISTRIBUTION,
                "dct:license",
                Distributions,
                20,
            ),
            IndicatorDescriptor::new(
                "reusability_license_from_vocabulary",
                Reusability,
                DISTRIBUTION,
                "dct:license".into(),
                Distributions,
                10,
                FixedVocabulary {
                    source: VocabularySource::Licenses,
                    column: 0,
                    matching: MatchingStrategy::ContainsVocabularyTerm,
                },
            ),
            property("reusability_access_rights_available", Reusability, DATASET, "dct:accessRights", Datasets, 10),
            IndicatorDescriptor::new(
                "reusability_access_rights_from_vocabulary",
                Reusability,
                DATASET,
                "dct:accessRights".into(),
                Datasets,
                5,
                FixedVocabulary {
                    source: VocabularySource::AccessRight,
                    column: 0,
                    matching: MatchingStrategy::VocabularyContainsValue,
                },
            ),
            property("reusability_contact_point_available", Reusability, DATASET, "dcat:contactPoint", Datasets, 20),
            property("reusability_publisher_available", Reusability, DATASET, "dct:publisher", Datasets, 10),
            property("contextuality_rights_available", Contextuality, DISTRIBUTION, "dct:rights", Distributions, 5),
            property(
                "contextuality_file_size_available",
                Contextuality,
                DISTRIBUTION,
                "dcat:byteSize",
                Distributions,
                5,
            ),
            property("contextuality_issued_available", Contextuality, DATASET, "dct:issued", Datasets, 5),
            property("contextuality_modified_available", Contextuality, DATASET, "dct:modified", Datasets, 5),
        ])
    }

    /// Parse a table from `[[indicator]]` entries.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndicatorDescriptor> {
        self.indicators.iter()
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&IndicatorDescriptor> {
        self.indicators.iter().find(|indicator| indicator.key == key)
    }

    /// Sum of all indicator weights.
    pub fn weight_total(&self) -> u32 {
        self.indicators.iter().map(|indicator| indicator.weight).sum()
    }

    /// Check the table's structural rules.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.indicators.is_empty() {
            report.push(ValidationIssue::error(
                "empty_table",
                IssueTarget::Table,
                "indicator table has no entries",
            ));
        }

        let mut seen = HashSet::new();
        for (position, indicator) in self.indicators.iter().enumerate() {
            let key = indicator.key.as_str();
            if key.trim().is_empty() {
                report.push(ValidationIssue::error(
                    "empty_key",
                    IssueTarget::indicator(position, "key"),
                    "indicator key is empty",
                ));
            } else if !seen.insert(key) {
                report.push(ValidationIssue::error(
                    "duplicate_key",
                    IssueTarget::indicator(position, "key"),
                    format!("'{key}' already names an earlier indicator"),
                ));
            }
            if indicator.weight == 0 {
                report.push(ValidationIssue::error(
                    "invalid_weight",
                    IssueTarget::indicator(position, "weight"),
                    format!("'{key}' has weight 0; weights are positive integers"),
                ));
            }
            if indicator.entity_type.trim().is_empty() {
                report.push(ValidationIssue::error(
                    "empty_entity_type",
                    IssueTarget::indicator(position, "entity_type"),
                    format!("'{key}' has no entity type"),
                ));
            }

            let paths = indicator.property.paths();
            if paths.is_empty() || paths.iter().any(|property| property.trim().is_empty()) {
                report.push(ValidationIssue::error(
                    "empty_property",
                    IssueTarget::indicator(position, "property"),
                    format!("'{key}' has an empty property"),
                ));
            }

            match &indicator.strategy {
                CountingStrategy::CatalogVocabulary { sources } => {
                    if sources.len() != paths.len() {
                        report.push(ValidationIssue::error(
                            "source_count_mismatch",
                            IssueTarget::indicator(position, "sources"),
                            format!(
                                "'{key}' lists {} source(s) for {} propert(ies); give one per property",
                                sources.len(),
                                paths.len()
                            ),
                        ));
                    }
                }
                other if indicator.property.is_multiple() => {
                    report.push(ValidationIssue::error(
                        "multiple_properties",
                        IssueTarget::indicator(position, "property"),
                        format!(
                            "'{key}' uses strategy '{}' which takes a single property",
                            other.name()
                        ),
                    ));
                }
                _ => {}
            }
        }
        report
    }

    /// Validate and return the table, or the issues as [`EvalError::InvalidTable`].
    pub fn validated(self) -> Result<Self> {
        let report = self.validate();
        if report.is_ok() {
            Ok(self)
        } else {
            Err(EvalError::InvalidTable(report))
        }
    }
}

impl Default for IndicatorTable {
    fn default() -> Self {
        Self::default_mqa()
    }
}

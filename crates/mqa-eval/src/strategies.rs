//! Count resolution per counting strategy.
//!
//! Every strategy turns a descriptor into an [`IndicatorCount`]. Failures
//! are folded into sentinel counts here so the engine loop never aborts:
//! query and vocabulary failures give -1, a validator failure gives 0, and
//! missing shape configuration gives -1.

use mqa_core::{CatalogGraph, CatalogType, ValueCount, last_path_segment};
use mqa_vocab::{VocabularyProvider, VocabularySource};
use tracing::{error, warn};

use crate::indicators::{CountingStrategy, IndicatorDescriptor};
use crate::matching::{MatchingStrategy, Vocabulary};
use crate::model::{AuditRecord, PopulationCounts};
use crate::reachability::ReachabilityProber;
use crate::shacl::{ShaclOracle, ShapeFiles};

/// Count meaning "not evaluated".
pub const NOT_EVALUATED: i64 = -1;

/// Everything a strategy may read while counting.
pub struct StrategyContext<'a> {
    pub graph: &'a CatalogGraph,
    pub populations: PopulationCounts,
    pub catalog_type: CatalogType,
    pub vocabularies: &'a dyn VocabularyProvider,
    pub prober: ReachabilityProber<'a>,
    pub oracle: Option<&'a dyn ShaclOracle>,
    pub shapes: Option<&'a ShapeFiles>,
}

/// Count, denominator and audit output of one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorCount {
    pub count: i64,
    pub population: u64,
    pub audit: Option<AuditRecord>,
    /// Why the count is a sentinel, when it is one.
    pub failure: Option<String>,
}

impl IndicatorCount {
    fn counted(count: u64, population: u64) -> Self {
        Self {
            count: i64::try_from(count).unwrap_or(i64::MAX),
            population,
            audit: None,
            failure: None,
        }
    }

    fn failed(count: i64, population: u64, failure: String) -> Self {
        Self {
            count,
            population,
            audit: None,
            failure: Some(failure),
        }
    }
}

/// Which graph values a catalog-type-driven vocabulary indicator inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSelection {
    /// Grouped values of the indicator's own property.
    PropertyValues,
    /// Last `/` segment of the `rdfs:label` on each distribution's format resource.
    FormatLabelSegments,
}

/// Vocabulary column, matching rule and value selection for a catalog type.
///
/// `ckan_uris` and `edp` exporters write vocabulary URIs; `ckan` writes
/// labels; `nti` labels a separate format resource.
pub fn catalog_vocabulary_rule(catalog_type: CatalogType) -> (usize, MatchingStrategy, ValueSelection) {
    match catalog_type {
        CatalogType::CkanUris | CatalogType::Edp => (
            0,
            MatchingStrategy::ContainsVocabularyTerm,
            ValueSelection::PropertyValues,
        ),
        CatalogType::Ckan => (
            1,
            MatchingStrategy::VocabularyContainsValue,
            ValueSelection::PropertyValues,
        ),
        CatalogType::Nti => (
            0,
            MatchingStrategy::VocabularyContainsValue,
            ValueSelection::FormatLabelSegments,
        ),
    }
}

/// Resolve the count for `descriptor`.
pub async fn resolve_count(
    descriptor: &IndicatorDescriptor,
    ctx: &StrategyContext<'_>,
) -> IndicatorCount {
    let population = ctx.populations.get(descriptor.population);
    match &descriptor.strategy {
        CountingStrategy::EntityProperty => entity_property(descriptor, ctx, population),
        CountingStrategy::ReachableUrls => reachable_urls(descriptor, ctx, population).await,
        CountingStrategy::CatalogVocabulary { sources } => {
            catalog_vocabulary(descriptor, sources, ctx, population)
        }
        CountingStrategy::FixedVocabulary {
            source,
            column,
            matching,
        } => fixed_vocabulary(descriptor, *source, *column, *matching, ctx, population),
        CountingStrategy::ShaclConformance => shacl_conformance(descriptor, ctx, population).await,
    }
}

fn entity_property(
    descriptor: &IndicatorDescriptor,
    ctx: &StrategyContext<'_>,
    population: u64,
) -> IndicatorCount {
    let property = descriptor.property.joined();
    match ctx
        .graph
        .count_entity_property(&descriptor.entity_type, &property)
    {
        Ok(count) => IndicatorCount::counted(count, population),
        Err(err) => IndicatorCount::failed(NOT_EVALUATED, population, err.to_string()),
    }
}

async fn reachable_urls(
    descriptor: &IndicatorDescriptor,
    ctx: &StrategyContext<'_>,
    population: u64,
) -> IndicatorCount {
    let property = descriptor.property.joined();
    let values = match ctx
        .graph
        .count_values_grouped(&descriptor.entity_type, &property)
    {
        Ok(values) => values,
        Err(err) => return IndicatorCount::failed(NOT_EVALUATED, population, err.to_string()),
    };

    let outcome = ctx.prober.probe_all(values).await;
    let mut result = IndicatorCount::counted(outcome.reachable_occurrences, population);
    result.audit = Some(AuditRecord::UnreachableUrls {
        indicator: descriptor.key.clone(),
        property,
        urls: outcome.unreachable,
    });
    result
}

fn catalog_vocabulary(
    descriptor: &IndicatorDescriptor,
    sources: &[VocabularySource],
    ctx: &StrategyContext<'_>,
    population: u64,
) -> IndicatorCount {
    let paths = descriptor.property.paths();
    let population = population * paths.len() as u64;
    let (column, matching, selection) = catalog_vocabulary_rule(ctx.catalog_type);

    let mut total = 0;
    for (property, source) in paths.iter().zip(sources) {
        let vocabulary = match load_vocabulary(ctx, *source, column) {
            Ok(vocabulary) => vocabulary,
            Err(failure) => return IndicatorCount::failed(NOT_EVALUATED, population, failure),
        };
        let counted = match selection {
            ValueSelection::PropertyValues => ctx
                .graph
                .count_values_grouped(&descriptor.entity_type, property)
                .map(|values| count_matching(&values, &vocabulary, matching, |value| value)),
            ValueSelection::FormatLabelSegments => ctx
                .graph
                .count_format_labels_grouped()
                .map(|labels| count_matching(&labels, &vocabulary, matching, last_path_segment)),
        };
        match counted {
            Ok(count) => total += count,
            Err(err) => return IndicatorCount::failed(NOT_EVALUATED, population, err.to_string()),
        }
    }
    IndicatorCount::counted(total, population)
}

fn fixed_vocabulary(
    descriptor: &IndicatorDescriptor,
    source: VocabularySource,
    column: usize,
    matching: MatchingStrategy,
    ctx: &StrategyContext<'_>,
    population: u64,
) -> IndicatorCount {
    let vocabulary = match load_vocabulary(ctx, source, column) {
        Ok(vocabulary) => vocabulary,
        Err(failure) => return IndicatorCount::failed(NOT_EVALUATED, population, failure),
    };
    let property = descriptor.property.joined();
    match ctx
        .graph
        .count_values_grouped(&descriptor.entity_type, &property)
    {
        Ok(values) => IndicatorCount::counted(
            count_matching(&values, &vocabulary, matching, |value| value),
            population,
        ),
        Err(err) => IndicatorCount::failed(NOT_EVALUATED, population, err.to_string()),
    }
}

async fn shacl_conformance(
    descriptor: &IndicatorDescriptor,
    ctx: &StrategyContext<'_>,
    population: u64,
) -> IndicatorCount {
    let Some(shapes) = ctx.shapes else {
        return IndicatorCount::failed(NOT_EVALUATED, population, "no shape files configured".to_string());
    };
    let missing = shapes.missing();
    if !missing.is_empty() {
        let missing: Vec<String> = missing.iter().map(|path| path.display().to_string()).collect();
        return IndicatorCount::failed(
            NOT_EVALUATED,
            population,
            format!("missing shape files: {}", missing.join(", ")),
        );
    }
    let Some(oracle) = ctx.oracle else {
        return IndicatorCount::failed(NOT_EVALUATED, population, "no shacl validator configured".to_string());
    };

    match oracle.validate(ctx.graph, shapes).await {
        Ok(outcome) if outcome.conforms => IndicatorCount::counted(population, population),
        Ok(outcome) => {
            let mut result = IndicatorCount::counted(0, population);
            result.audit = Some(AuditRecord::ShaclReport {
                indicator: descriptor.key.clone(),
                diagnostics: outcome.diagnostics,
            });
            result
        }
        Err(err) => {
            error!(indicator = %descriptor.key, oracle = oracle.name(), error = %err, "shacl validation failed");
            IndicatorCount::failed(0, population, err.to_string())
        }
    }
}

fn load_vocabulary(
    ctx: &StrategyContext<'_>,
    source: VocabularySource,
    column: usize,
) -> Result<Vocabulary, String> {
    match ctx.vocabularies.load(source, column) {
        Ok(terms) => Ok(Vocabulary::new(terms)),
        Err(err) => {
            warn!(vocabulary = %source, column, error = %err, "vocabulary unavailable");
            Err(err.to_string())
        }
    }
}

/// Sum the occurrences of values whose candidate string matches the vocabulary.
pub fn count_matching<F>(
    values: &[ValueCount],
    vocabulary: &Vocabulary,
    matching: MatchingStrategy,
    candidate: F,
) -> u64
where
    F: Fn(&str) -> &str,
{
    values
        .iter()
        .filter(|value| matching.matches(vocabulary, candidate(&value.value)))
        .map(|value| value.occurrences)
        .sum()
}

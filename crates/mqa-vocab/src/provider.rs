use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use crate::errors::{Result, VocabularyError};
use crate::source::VocabularySource;

/// Source of controlled-vocabulary terms.
pub trait VocabularyProvider: Send + Sync {
    /// Return the non-empty values of `column` for every row of `source`, in file order.
    fn load(&self, source: VocabularySource, column: usize) -> Result<Vec<String>>;
}

/// Reads vocabularies from headerless CSV files in one directory.
#[derive(Debug, Clone)]
pub struct CsvVocabularyProvider {
    dir: PathBuf,
}

impl CsvVocabularyProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, source: VocabularySource) -> PathBuf {
        self.dir.join(source.file_name())
    }
}

impl VocabularyProvider for CsvVocabularyProvider {
    fn load(&self, source: VocabularySource, column: usize) -> Result<Vec<String>> {
        let path = self.path_for(source);
        if !path.exists() {
            return Err(VocabularyError::MissingSource(path.display().to_string()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;

        let mut terms = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(field) = record.get(column) {
                let field = field.trim();
                if !field.is_empty() {
                    terms.push(field.to_string());
                }
            }
        }

        debug!(
            vocabulary = %source,
            column,
            terms = terms.len(),
            "vocabulary loaded"
        );
        Ok(terms)
    }
}

/// Vocabularies held in memory, keyed by source. Rows follow the CSV column layout.
#[derive(Debug, Clone, Default)]
pub struct StaticVocabularyProvider {
    rows: HashMap<VocabularySource, Vec<Vec<String>>>,
}

impl StaticVocabularyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows<R, F>(mut self, source: VocabularySource, rows: R) -> Self
    where
        R: IntoIterator<Item = F>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        self.rows.insert(source, rows);
        self
    }
}

impl VocabularyProvider for StaticVocabularyProvider {
    fn load(&self, source: VocabularySource, column: usize) -> Result<Vec<String>> {
        let rows = self
            .rows
            .get(&source)
            .ok_or_else(|| VocabularyError::MissingSource(source.to_string()))?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|value| !value.is_empty())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_selects_column() {
        let provider = StaticVocabularyProvider::new().with_rows(
            VocabularySource::MediaTypes,
            vec![
                vec!["http://www.iana.org/assignments/media-types/text/csv", "text/csv"],
                vec!["http://www.iana.org/assignments/media-types/application/json", ""],
                vec!["http://www.iana.org/assignments/media-types/only-uri"],
            ],
        );

        let uris = provider.load(VocabularySource::MediaTypes, 0).unwrap();
        assert_eq!(uris.len(), 3);
        let labels = provider.load(VocabularySource::MediaTypes, 1).unwrap();
        assert_eq!(labels, vec!["text/csv".to_string()]);
    }

    #[test]
    fn static_provider_reports_missing_source() {
        let provider = StaticVocabularyProvider::new();
        let err = provider.load(VocabularySource::Licenses, 0).unwrap_err();
        assert!(matches!(err, VocabularyError::MissingSource(_)));
    }
}

//! Vocabulary matching policies.
//!
//! All comparisons are case-insensitive. Terms are lowercased once when the
//! [`Vocabulary`] is built; candidates are lowercased per call and otherwise
//! compared as given, so an empty candidate is contained in every term.

use serde::{Deserialize, Serialize};

/// Lowercased controlled-vocabulary terms. Empty terms are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|term| term.as_ref().trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// How a graph value is compared with a vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStrategy {
    /// The candidate embeds some vocabulary term.
    ContainsVocabularyTerm,
    /// Some vocabulary term embeds the candidate.
    VocabularyContainsValue,
    /// The candidate equals some vocabulary term.
    ExactSetMembership,
}

impl MatchingStrategy {
    pub fn matches(self, vocabulary: &Vocabulary, candidate: &str) -> bool {
        match self {
            MatchingStrategy::ContainsVocabularyTerm => contains_vocabulary_term(vocabulary, candidate),
            MatchingStrategy::VocabularyContainsValue => {
                vocabulary_contains_value(vocabulary, candidate)
            }
            MatchingStrategy::ExactSetMembership => exact_set_membership(vocabulary, candidate),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchingStrategy::ContainsVocabularyTerm => "contains_vocabulary_term",
            MatchingStrategy::VocabularyContainsValue => "vocabulary_contains_value",
            MatchingStrategy::ExactSetMembership => "exact_set_membership",
        }
    }
}

/// True when `candidate` contains any vocabulary term as a substring.
pub fn contains_vocabulary_term(vocabulary: &Vocabulary, candidate: &str) -> bool {
    let candidate = candidate.to_lowercase();
    vocabulary
        .terms
        .iter()
        .any(|term| candidate.contains(term.as_str()))
}

/// True when any vocabulary term contains `candidate` as a substring.
pub fn vocabulary_contains_value(vocabulary: &Vocabulary, candidate: &str) -> bool {
    let candidate = candidate.to_lowercase();
    vocabulary
        .terms
        .iter()
        .any(|term| term.contains(candidate.as_str()))
}

/// True when `candidate` equals a vocabulary term.
pub fn exact_set_membership(vocabulary: &Vocabulary, candidate: &str) -> bool {
    let candidate = candidate.to_lowercase();
    vocabulary.terms.iter().any(|term| *term == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_contains_value_checks_terms() {
        let vocabulary = Vocabulary::new(["application/json"]);
        assert!(vocabulary_contains_value(&vocabulary, "json"));
        assert!(vocabulary_contains_value(&vocabulary, "JSON"));
        assert!(!vocabulary_contains_value(&vocabulary, "application/json+ld"));
    }

    #[test]
    fn contains_vocabulary_term_checks_candidate() {
        let vocabulary = Vocabulary::new(["json"]);
        assert!(contains_vocabulary_term(&vocabulary, "application/json"));
        assert!(contains_vocabulary_term(
            &vocabulary,
            "http://www.iana.org/assignments/media-types/application/JSON"
        ));
        assert!(!contains_vocabulary_term(&vocabulary, "text/csv"));
    }

    #[test]
    fn exact_membership_ignores_case_only() {
        let vocabulary = Vocabulary::new(["PUBLIC"]);
        assert!(exact_set_membership(&vocabulary, "public"));
        assert!(!exact_set_membership(&vocabulary, "PUBLIC-ish"));
        assert!(!exact_set_membership(&vocabulary, "PUBLI"));
    }

    #[test]
    fn empty_terms_are_dropped() {
        let vocabulary = Vocabulary::new(["", "  ", "CSV"]);
        assert_eq!(vocabulary.terms(), ["csv"]);
    }

    #[test]
    fn empty_candidate_is_inside_every_term() {
        let vocabulary = Vocabulary::new(["text/csv"]);
        assert!(vocabulary_contains_value(&vocabulary, ""));
        assert!(!contains_vocabulary_term(&vocabulary, ""));
        assert!(!exact_set_membership(&vocabulary, ""));
        assert!(!vocabulary_contains_value(&Vocabulary::default(), ""));
    }

    #[test]
    fn candidates_are_not_trimmed() {
        let vocabulary = Vocabulary::new(["text/csv"]);
        assert!(!vocabulary_contains_value(&vocabulary, " csv"));
        assert!(vocabulary_contains_value(&vocabulary, "/csv"));
        assert!(!exact_set_membership(&vocabulary, "text/csv "));
    }

    #[test]
    fn empty_vocabulary_matches_nothing() {
        let vocabulary = Vocabulary::default();
        assert!(!contains_vocabulary_term(&vocabulary, "csv"));
        assert!(!vocabulary_contains_value(&vocabulary, "csv"));
        assert!(!exact_set_membership(&vocabulary, "csv"));
    }
}

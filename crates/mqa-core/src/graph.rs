use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

pub use oxigraph::io::RdfFormat;
use oxigraph::io::RdfParser;
use oxigraph::model::{GraphNameRef, Term};
use oxigraph::sparql::{QueryResults, QuerySolution};
use oxigraph::store::Store;
use serde::{Deserialize, Serialize};

use crate::catalog::DISTRIBUTION;
use crate::error::{Error, Result};
use crate::namespaces::sparql_prologue;

/// A distinct property value and the number of distinct resources holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub occurrences: u64,
}

/// In-memory RDF graph of a catalog with the pattern queries indicators need.
///
/// The graph is loaded once and only read afterwards; every count is a
/// SPARQL query against the default graph. Entity types and properties are
/// CURIEs or property paths spliced into the query text, so a malformed
/// path surfaces as [`Error::Query`].
#[derive(Clone)]
pub struct CatalogGraph {
    store: Store,
}

impl fmt::Debug for CatalogGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogGraph").finish_non_exhaustive()
    }
}

impl CatalogGraph {
    /// Create an empty graph.
    pub fn empty() -> Result<Self> {
        let store = Store::new().map_err(|err| Error::Storage(err.to_string()))?;
        Ok(Self { store })
    }

    /// Parse a serialized graph.
    pub fn from_reader(format: RdfFormat, reader: impl Read) -> Result<Self> {
        let graph = Self::empty()?;
        graph.load(format, None, reader)?;
        Ok(graph)
    }

    /// Parse a graph file, guessing the syntax from the extension when
    /// `format` is not given.
    pub fn from_path(path: &Path, format: Option<RdfFormat>) -> Result<Self> {
        let format = match format {
            Some(format) => format,
            None => format_from_path(path)
                .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?,
        };
        let file = File::open(path)?;
        Self::from_reader(format, BufReader::new(file))
    }

    /// Merge more triples into the default graph.
    pub fn load(&self, format: RdfFormat, base_iri: Option<&str>, reader: impl Read) -> Result<()> {
        let mut parser = RdfParser::from_format(format);
        if let Some(base_iri) = base_iri {
            parser = parser
                .with_base_iri(base_iri)
                .map_err(|err| Error::Load(err.to_string()))?;
        }
        self.store
            .load_from_reader(parser, reader)
            .map_err(|err| Error::Load(err.to_string()))
    }

    /// Number of triples in the graph.
    pub fn len(&self) -> Result<usize> {
        self.store
            .len()
            .map_err(|err| Error::Storage(err.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Count distinct resources typed `entity_type`.
    pub fn count_entities(&self, entity_type: &str) -> Result<u64> {
        let query = format!(
            "{}SELECT (COUNT(DISTINCT ?resource) AS ?values) WHERE {{\n\
             \x20   ?resource rdf:type {entity_type} .\n\
             }}",
            sparql_prologue()
        );
        self.single_count(&query)
    }

    /// Count distinct resources typed `entity_type` with at least one value for `property`.
    pub fn count_entity_property(&self, entity_type: &str, property: &str) -> Result<u64> {
        let query = format!(
            "{}SELECT (COUNT(DISTINCT ?resource) AS ?values) WHERE {{\n\
             \x20   ?resource rdf:type {entity_type} .\n\
             \x20   ?resource {property} ?value .\n\
             }}",
            sparql_prologue()
        );
        self.single_count(&query)
    }

    /// Group the values of `property` on resources typed `entity_type`.
    ///
    /// Each distinct value carries the number of distinct resources holding
    /// it, so a value shared by N resources weighs N when it matches.
    pub fn count_values_grouped(&self, entity_type: &str, property: &str) -> Result<Vec<ValueCount>> {
        let query = format!(
            "{}SELECT ?value (COUNT(DISTINCT ?resource) AS ?count) WHERE {{\n\
             \x20   ?resource a {entity_type} .\n\
             \x20   ?resource {property} ?value .\n\
             }}\n\
             GROUP BY ?value\n\
             ORDER BY ?value",
            sparql_prologue()
        );
        self.grouped_counts(&query)
    }

    /// Group the `rdfs:label`s of distribution format resources.
    ///
    /// NTI-RISP catalogs point `dct:format` at a `dct:IMT` node and put the
    /// media type in its label instead of on the distribution.
    pub fn count_format_labels_grouped(&self) -> Result<Vec<ValueCount>> {
        let query = format!(
            "{}SELECT ?value (COUNT(DISTINCT ?resource) AS ?count) WHERE {{\n\
             \x20   ?resource a {DISTRIBUTION} .\n\
             \x20   ?resource dct:format ?format .\n\
             \x20   ?format rdfs:label ?value .\n\
             }}\n\
             GROUP BY ?value\n\
             ORDER BY ?value",
            sparql_prologue()
        );
        self.grouped_counts(&query)
    }

    /// Run a SELECT query (the shared prologue is prepended) and return each
    /// solution as variable name to lexical value.
    pub fn select(&self, query: &str) -> Result<Vec<BTreeMap<String, String>>> {
        let query = format!("{}{query}", sparql_prologue());
        let rows = self
            .solutions(&query)?
            .into_iter()
            .map(|solution| {
                solution
                    .iter()
                    .map(|(variable, term)| (variable.as_str().to_string(), term_text(term)))
                    .collect()
            })
            .collect();
        Ok(rows)
    }

    /// Serialize the default graph.
    pub fn write<W: Write>(&self, format: RdfFormat, writer: W) -> Result<W> {
        self.store
            .dump_graph_to_writer(GraphNameRef::DefaultGraph, format, writer)
            .map_err(|err| Error::Serialize(err.to_string()))
    }

    fn single_count(&self, query: &str) -> Result<u64> {
        let solutions = self.solutions(query)?;
        match solutions.first() {
            Some(solution) => integer_binding(solution, "values"),
            None => Ok(0),
        }
    }

    fn grouped_counts(&self, query: &str) -> Result<Vec<ValueCount>> {
        let mut counts = Vec::new();
        for solution in self.solutions(query)? {
            let Some(value) = solution.get("value") else {
                continue;
            };
            counts.push(ValueCount {
                value: term_text(value),
                occurrences: integer_binding(&solution, "count")?,
            });
        }
        Ok(counts)
    }

    fn solutions(&self, query: &str) -> Result<Vec<QuerySolution>> {
        match self
            .store
            .query(query)
            .map_err(|err| Error::Query(err.to_string()))?
        {
            QueryResults::Solutions(solutions) => solutions
                .map(|solution| solution.map_err(|err| Error::Query(err.to_string())))
                .collect(),
            _ => Err(Error::Query("expected a SELECT query".to_string())),
        }
    }
}

/// RDF syntax for a file extension (`.rdf` and `.xml` are RDF/XML).
pub fn format_from_path(path: &Path) -> Option<RdfFormat> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
        other => RdfFormat::from_extension(other),
    }
}

/// RDF syntax for a media type, accepting the short names catalogs are
/// usually configured with (`turtle`, `xml`).
pub fn format_from_media_type(media_type: &str) -> Option<RdfFormat> {
    match media_type.trim().to_lowercase().as_str() {
        "turtle" | "ttl" => Some(RdfFormat::Turtle),
        "xml" | "rdfxml" | "pretty-xml" => Some(RdfFormat::RdfXml),
        "nt" | "ntriples" => Some(RdfFormat::NTriples),
        other => RdfFormat::from_media_type(other),
    }
}

fn integer_binding(solution: &QuerySolution, variable: &str) -> Result<u64> {
    match solution.get(variable) {
        Some(Term::Literal(literal)) => literal.value().parse::<u64>().map_err(|err| {
            Error::Query(format!(
                "non-integer ?{variable} binding '{}': {err}",
                literal.value()
            ))
        }),
        Some(other) => Err(Error::Query(format!(
            "unexpected ?{variable} binding: {other}"
        ))),
        None => Ok(0),
    }
}

fn term_text(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_from_extensions() {
        assert_eq!(format_from_path(Path::new("catalog.rdf")), Some(RdfFormat::RdfXml));
        assert_eq!(format_from_path(Path::new("catalog.TTL")), Some(RdfFormat::Turtle));
        assert_eq!(format_from_path(Path::new("catalog.nt")), Some(RdfFormat::NTriples));
        assert_eq!(format_from_path(Path::new("catalog")), None);
    }

    #[test]
    fn formats_from_media_types() {
        assert_eq!(
            format_from_media_type("application/rdf+xml"),
            Some(RdfFormat::RdfXml)
        );
        assert_eq!(format_from_media_type("turtle"), Some(RdfFormat::Turtle));
        assert_eq!(format_from_media_type("text/turtle"), Some(RdfFormat::Turtle));
        assert_eq!(format_from_media_type("application/pdf"), None);
    }
}

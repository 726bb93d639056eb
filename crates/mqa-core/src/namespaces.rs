//! Namespace IRIs used by DCAT-AP catalogs and the vocabularies they cite.

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const DCT: &str = "http://purl.org/dc/terms/";
pub const DCAT: &str = "http://www.w3.org/ns/dcat#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";
pub const SKOS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const VCARD: &str = "http://www.w3.org/2006/vcard/ns#";
pub const EUROVOC: &str = "http://publications.europa.eu/ontology/euvoc#";
pub const HYDRA: &str = "http://www.w3.org/ns/hydra/core#";

/// Prefixes available to every query issued through the graph facade.
///
/// Indicator properties are written as CURIEs (`dcat:keyword`), so each
/// prefix a table may use must be declared here.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("dct", DCT),
    ("dcterms", DCT),
    ("dcat", DCAT),
    ("xsd", XSD),
    ("foaf", FOAF),
    ("skos", SKOS),
    ("vcard", VCARD),
    ("euvoc", EUROVOC),
    ("hydra", HYDRA),
];

/// Render the SPARQL prologue declaring [`PREFIXES`].
pub fn sparql_prologue() -> String {
    PREFIXES
        .iter()
        .map(|(prefix, iri)| format!("PREFIX {prefix}: <{iri}>\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prologue_declares_every_prefix() {
        let prologue = sparql_prologue();
        assert_eq!(prologue.lines().count(), PREFIXES.len());
        assert!(prologue.contains("PREFIX dcat: <http://www.w3.org/ns/dcat#>"));
        assert!(prologue.contains("PREFIX dct: <http://purl.org/dc/terms/>"));
    }
}

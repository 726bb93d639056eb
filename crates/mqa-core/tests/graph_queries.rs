use anyhow::Result;
use mqa_core::{CatalogGraph, DATASET, DISTRIBUTION, Error, RdfFormat};

const CATALOG: &str = r#"
@prefix dcat: <http://www.w3.org/ns/dcat#> .
@prefix dct: <http://purl.org/dc/terms/> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/dataset/1> a dcat:Dataset, dcat:Dataset ;
    dcat:keyword "water", "rivers" ;
    dcat:distribution <http://example.org/dist/1>, <http://example.org/dist/2> .

<http://example.org/dataset/2> a dcat:Dataset ;
    dcat:keyword "air" ;
    dcat:distribution <http://example.org/dist/3> .

<http://example.org/dataset/3> a dcat:Dataset .

<http://example.org/dist/1> a dcat:Distribution ;
    dcat:accessURL <http://example.org/shared> ;
    dct:format <http://publications.europa.eu/resource/authority/file-type/CSV> .

<http://example.org/dist/2> a dcat:Distribution ;
    dcat:accessURL <http://example.org/shared> ;
    dct:format [ a dct:IMT ; rdfs:label "text/csv" ] .

<http://example.org/dist/3> a dcat:Distribution ;
    dcat:accessURL <http://example.org/other> .
"#;

fn catalog() -> Result<CatalogGraph> {
    Ok(CatalogGraph::from_reader(RdfFormat::Turtle, CATALOG.as_bytes())?)
}

#[test]
fn counts_distinct_entities() -> Result<()> {
    let graph = catalog()?;
    assert_eq!(graph.count_entities(DATASET)?, 3);
    assert_eq!(graph.count_entities(DISTRIBUTION)?, 3);
    Ok(())
}

#[test]
fn counts_resources_with_property_once() -> Result<()> {
    let graph = catalog()?;
    assert_eq!(graph.count_entity_property(DATASET, "dcat:keyword")?, 2);
    assert_eq!(graph.count_entity_property(DATASET, "dct:spatial")?, 0);
    assert_eq!(graph.count_entity_property(DISTRIBUTION, "dct:format")?, 2);
    Ok(())
}

#[test]
fn groups_values_by_resource_occurrence() -> Result<()> {
    let graph = catalog()?;
    let grouped = graph.count_values_grouped(DISTRIBUTION, "dcat:accessURL")?;
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0].value, "http://example.org/other");
    assert_eq!(grouped[0].occurrences, 1);
    assert_eq!(grouped[1].value, "http://example.org/shared");
    assert_eq!(grouped[1].occurrences, 2);
    Ok(())
}

#[test]
fn groups_format_resource_labels() -> Result<()> {
    let graph = catalog()?;
    let labels = graph.count_format_labels_grouped()?;
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].value, "text/csv");
    assert_eq!(labels[0].occurrences, 1);
    Ok(())
}

#[test]
fn malformed_property_is_a_query_error() -> Result<()> {
    let graph = catalog()?;
    let err = graph
        .count_entity_property(DATASET, "dcat:keyword ))")
        .expect_err("malformed path must fail");
    assert!(matches!(err, Error::Query(_)));

    let err = graph
        .count_entity_property(DATASET, "unknown:prefix")
        .expect_err("undeclared prefix must fail");
    assert!(matches!(err, Error::Query(_)));
    Ok(())
}

#[test]
fn select_returns_lexical_values() -> Result<()> {
    let graph = catalog()?;
    let rows = graph.select(
        "SELECT ?keyword WHERE { <http://example.org/dataset/2> dcat:keyword ?keyword }",
    )?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("keyword").map(String::as_str), Some("air"));
    Ok(())
}

#[test]
fn merged_pages_share_one_graph() -> Result<()> {
    let graph = catalog()?;
    let before = graph.len()?;
    graph.load(
        RdfFormat::NTriples,
        None,
        "<http://example.org/dataset/4> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/ns/dcat#Dataset> .\n"
            .as_bytes(),
    )?;
    assert_eq!(graph.len()?, before + 1);
    assert_eq!(graph.count_entities(DATASET)?, 4);
    Ok(())
}

#[test]
fn writes_ntriples_that_reload() -> Result<()> {
    let graph = catalog()?;
    let bytes = graph.write(RdfFormat::NTriples, Vec::new())?;
    let reloaded = CatalogGraph::from_reader(RdfFormat::NTriples, bytes.as_slice())?;
    assert_eq!(reloaded.count_entities(DATASET)?, 3);
    Ok(())
}

#[test]
fn rejects_unparseable_input() {
    let result = CatalogGraph::from_reader(RdfFormat::Turtle, "this is not turtle".as_bytes());
    assert!(matches!(result, Err(Error::Load(_))));
}

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use mqa_vocab::refresh::{
    extract_access_rights, extract_file_types, extract_licences, extract_media_types,
};
use mqa_vocab::{CsvVocabularyProvider, VocabularyError, VocabularyProvider, VocabularySource};

fn temp_vocab_dir(label: &str) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("mqa_vocab_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

const ACCESS_RIGHTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:skos="http://www.w3.org/2004/02/skos/core#">
  <skos:ConceptScheme rdf:about="http://publications.europa.eu/resource/authority/access-right"/>
  <skos:Concept rdf:about="http://publications.europa.eu/resource/authority/access-right/PUBLIC">
    <skos:prefLabel>public</skos:prefLabel>
  </skos:Concept>
  <skos:Concept rdf:about="http://publications.europa.eu/resource/authority/access-right/NON_PUBLIC">
    <skos:prefLabel>non-public</skos:prefLabel>
  </skos:Concept>
</rdf:RDF>"#;

const FILE_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:euvoc="http://publications.europa.eu/ontology/euvoc#">
  <euvoc:FileType rdf:about="http://publications.europa.eu/resource/authority/file-type/CSV">
    <euvoc:nonPropExt>true</euvoc:nonPropExt>
  </euvoc:FileType>
  <euvoc:FileType rdf:about="http://publications.europa.eu/resource/authority/file-type/XLS">
    <euvoc:nonPropExt>false</euvoc:nonPropExt>
  </euvoc:FileType>
  <euvoc:FileType rdf:about="http://publications.europa.eu/resource/authority/file-type/ZIP"/>
</rdf:RDF>"#;

const LICENCES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:skos="http://www.w3.org/2004/02/skos/core#">
  <skos:Concept rdf:about="http://publications.europa.eu/resource/authority/licence/CC_BY_4_0">
    <skos:exactMatch rdf:resource="https://creativecommons.org/licenses/by/4.0/"/>
  </skos:Concept>
  <skos:Concept rdf:about="http://publications.europa.eu/resource/authority/licence/APACHE_2_0"/>
</rdf:RDF>"#;

const MEDIA_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<registry xmlns="http://www.iana.org/assignments" id="media-types">
  <registry id="application">
    <record>
      <name>json</name>
      <file template="application/json">application/json</file>
    </record>
    <record>
      <name>example</name>
    </record>
  </registry>
  <registry id="text">
    <record>
      <name>csv</name>
      <file template="text/csv">text/csv</file>
    </record>
  </registry>
</registry>"#;

#[test]
fn csv_provider_reads_columns_in_file_order() -> Result<()> {
    let dir = temp_vocab_dir("provider")?;
    fs::write(
        dir.join("media-types.csv"),
        "http://www.iana.org/assignments/media-types/text/csv,text/csv\n\
         http://www.iana.org/assignments/media-types/application/json,application/json\n\
         http://www.iana.org/assignments/media-types/only-uri\n\
         ,\n",
    )?;

    let provider = CsvVocabularyProvider::new(&dir);
    let uris = provider.load(VocabularySource::MediaTypes, 0)?;
    assert_eq!(uris.len(), 3);
    assert_eq!(uris[0], "http://www.iana.org/assignments/media-types/text/csv");

    let labels = provider.load(VocabularySource::MediaTypes, 1)?;
    assert_eq!(labels, vec!["text/csv", "application/json"]);
    Ok(())
}

#[test]
fn csv_provider_reports_missing_file() -> Result<()> {
    let dir = temp_vocab_dir("missing")?;
    let provider = CsvVocabularyProvider::new(&dir);
    let err = provider
        .load(VocabularySource::Licenses, 0)
        .expect_err("no licenses.csv was written");
    assert!(matches!(err, VocabularyError::MissingSource(_)));
    Ok(())
}

#[test]
fn access_rights_skip_the_scheme_itself() -> Result<()> {
    let url = "http://publications.europa.eu/resource/authority/access-right";
    let rows = extract_access_rights(ACCESS_RIGHTS, url)?;
    let labels: Vec<&str> = rows.iter().map(|row| row[1].as_str()).collect();
    assert_eq!(labels, vec!["NON_PUBLIC", "PUBLIC"]);
    assert_eq!(
        rows[1][0],
        "http://publications.europa.eu/resource/authority/access-right/PUBLIC"
    );
    Ok(())
}

#[test]
fn file_types_split_non_proprietary_and_machine_readable() -> Result<()> {
    let tables = extract_file_types(FILE_TYPES, "http://example.org/filetypes-skos-ap-act.rdf")?;
    assert_eq!(tables.file_types.len(), 3);
    assert_eq!(
        tables.file_types[2],
        vec![
            "http://publications.europa.eu/resource/authority/file-type/ZIP".to_string(),
            "ZIP".to_string(),
            "false".to_string(),
        ]
    );
    let non_proprietary: Vec<&str> = tables
        .non_proprietary
        .iter()
        .map(|row| row[1].as_str())
        .collect();
    assert_eq!(non_proprietary, vec!["CSV"]);
    assert_eq!(tables.machine_readable.len(), 3);
    Ok(())
}

#[test]
fn licences_prefer_exact_match() -> Result<()> {
    let rows = extract_licences(LICENCES, "http://example.org/licences-skos-ap-act.rdf")?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][1], "APACHE_2_0");
    assert_eq!(
        rows[0][0],
        "http://publications.europa.eu/resource/authority/licence/APACHE_2_0"
    );
    assert_eq!(rows[1][0], "https://creativecommons.org/licenses/by/4.0/");
    assert_eq!(
        rows[1][2],
        "http://publications.europa.eu/resource/authority/licence/CC_BY_4_0"
    );
    Ok(())
}

#[test]
fn media_types_come_from_record_files() -> Result<()> {
    let rows = extract_media_types(
        MEDIA_TYPES,
        "http://www.iana.org/assignments/media-types/media-types.xml",
    )?;
    assert_eq!(
        rows,
        vec![
            vec![
                "http://www.iana.org/assignments/media-types/application/json".to_string(),
                "application/json".to_string(),
            ],
            vec![
                "http://www.iana.org/assignments/media-types/text/csv".to_string(),
                "text/csv".to_string(),
            ],
        ]
    );
    Ok(())
}

#[test]
fn malformed_media_registry_is_an_xml_error() {
    let result = extract_media_types(
        "<registry><record></file></registry>",
        "http://example.org/media-types.xml",
    );
    assert!(matches!(result, Err(VocabularyError::Xml(_))));
}

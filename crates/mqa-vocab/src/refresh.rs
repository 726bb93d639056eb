//! Rebuild the vocabulary CSVs from their published sources.
//!
//! EU Vocabularies publish access rights, file types and licences as
//! RDF/XML; IANA publishes media types as a registry XML document. Each
//! source is downloaded, reduced to rows and written as a headerless CSV
//! sorted by label. A failing source is logged and skipped so the others
//! still refresh.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mqa_core::{CatalogGraph, RdfFormat, last_path_segment};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{info, warn};

use crate::errors::{Result, VocabularyError};
use crate::source::VocabularySource;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// How a downloaded document is reduced to CSV rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    AccessRights,
    FileTypes,
    MediaTypes,
    Licences,
}

/// A published vocabulary and the CSV it refreshes.
#[derive(Debug, Clone, Copy)]
pub struct RemoteVocabulary {
    pub name: &'static str,
    pub source: VocabularySource,
    pub url: &'static str,
    pub kind: RemoteKind,
}

pub const REMOTE_VOCABULARIES: &[RemoteVocabulary] = &[
    RemoteVocabulary {
        name: "Access Right",
        source: VocabularySource::AccessRight,
        url: "http://publications.europa.eu/resource/authority/access-right",
        kind: RemoteKind::AccessRights,
    },
    RemoteVocabulary {
        name: "File Types",
        source: VocabularySource::FileTypes,
        url: "http://op.europa.eu/o/opportal-service/euvoc-download-handler?cellarURI=http://publications.europa.eu/resource/distribution/file-type/rdf/skos_ap_act/filetypes-skos-ap-act.rdf&fileName=filetypes-skos-ap-act.rdf",
        kind: RemoteKind::FileTypes,
    },
    RemoteVocabulary {
        name: "IANA Media Types",
        source: VocabularySource::MediaTypes,
        url: "http://www.iana.org/assignments/media-types/media-types.xml",
        kind: RemoteKind::MediaTypes,
    },
    RemoteVocabulary {
        name: "Licenses",
        source: VocabularySource::Licenses,
        url: "http://op.europa.eu/o/opportal-service/euvoc-download-handler?cellarURI=http://publications.europa.eu/resource/distribution/licence/rdf/skos_ap_act/licences-skos-ap-act.rdf&fileName=licences-skos-ap-act.rdf",
        kind: RemoteKind::Licences,
    },
];

/// Settings for a refresh run.
#[derive(Debug, Clone)]
pub struct RefreshOptions {
    pub dir: PathBuf,
    pub timeout: Duration,
    pub user_agent: String,
}

impl RefreshOptions {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Files written and sources skipped by a refresh run.
#[derive(Debug, Clone, Default)]
pub struct RefreshSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(String, String)>,
}

/// Download every entry of [`REMOTE_VOCABULARIES`] and rewrite its CSV.
pub async fn refresh_vocabularies(options: &RefreshOptions) -> Result<RefreshSummary> {
    fs::create_dir_all(&options.dir)?;
    let client = reqwest::Client::builder()
        .timeout(options.timeout)
        .user_agent(options.user_agent.clone())
        .build()?;

    let mut summary = RefreshSummary::default();
    for remote in REMOTE_VOCABULARIES {
        match refresh_one(&client, remote, &options.dir).await {
            Ok(written) => {
                info!(
                    vocabulary = remote.name,
                    files = written.len(),
                    "vocabulary refreshed"
                );
                summary.written.extend(written);
            }
            Err(err) => {
                warn!(vocabulary = remote.name, url = remote.url, error = %err, "vocabulary refresh failed");
                summary.failed.push((remote.name.to_string(), err.to_string()));
            }
        }
    }
    Ok(summary)
}

async fn refresh_one(
    client: &reqwest::Client,
    remote: &RemoteVocabulary,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let response = client.get(remote.url).send().await?.error_for_status()?;
    let body = response.text().await?;

    let mut tables = Vec::new();
    match remote.kind {
        RemoteKind::AccessRights => {
            tables.push((remote.source, extract_access_rights(&body, remote.url)?));
        }
        RemoteKind::Licences => {
            tables.push((remote.source, extract_licences(&body, remote.url)?));
        }
        RemoteKind::MediaTypes => {
            tables.push((remote.source, extract_media_types(&body, remote.url)?));
        }
        RemoteKind::FileTypes => {
            let file_types = extract_file_types(&body, remote.url)?;
            tables.push((VocabularySource::FileTypes, file_types.file_types));
            tables.push((VocabularySource::NonProprietary, file_types.non_proprietary));
            tables.push((VocabularySource::MachineReadable, file_types.machine_readable));
        }
    }

    let mut written = Vec::new();
    for (source, rows) in tables {
        // An empty extraction keeps the previous file.
        if rows.is_empty() {
            continue;
        }
        let path = dir.join(source.file_name());
        write_rows(&path, rows)?;
        written.push(path);
    }
    Ok(written)
}

/// Rows of `file-types.csv` and the two tables derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTypeTables {
    pub file_types: Vec<Vec<String>>,
    pub non_proprietary: Vec<Vec<String>>,
    pub machine_readable: Vec<Vec<String>>,
}

/// `(uri, last segment)` for every IRI subject of the access-right scheme.
pub fn extract_access_rights(rdf_xml: &str, source_url: &str) -> Result<Vec<Vec<String>>> {
    let graph = parse_rdf_xml(rdf_xml, source_url)?;
    let rows = graph.select("SELECT DISTINCT ?subject WHERE { ?subject ?p ?o . FILTER(isIRI(?subject)) }")?;

    let mut table = BTreeSet::new();
    for row in rows {
        let Some(uri) = row.get("subject") else {
            continue;
        };
        let label = last_path_segment(uri);
        if keeps_entry(uri, label, source_url) {
            table.insert(vec![uri.clone(), label.to_string()]);
        }
    }
    Ok(sort_by_label(table))
}

/// `(exactMatch or uri, last segment, concept uri)` for every `skos:Concept`.
pub fn extract_licences(rdf_xml: &str, source_url: &str) -> Result<Vec<Vec<String>>> {
    let graph = parse_rdf_xml(rdf_xml, source_url)?;
    let rows = graph.select(
        "SELECT ?concept ?match WHERE {\n\
         \x20   ?concept a skos:Concept .\n\
         \x20   OPTIONAL { ?concept skos:exactMatch ?match }\n\
         }\n\
         ORDER BY ?concept ?match",
    )?;

    let mut matches: BTreeMap<String, String> = BTreeMap::new();
    for row in rows {
        let Some(concept) = row.get("concept") else {
            continue;
        };
        let matched = row.get("match").cloned().unwrap_or_else(|| concept.clone());
        matches.entry(concept.clone()).or_insert(matched);
    }

    let mut table = BTreeSet::new();
    for (concept, matched) in matches {
        let label = last_path_segment(&concept).to_string();
        if keeps_entry(&concept, &label, source_url) {
            table.insert(vec![matched, label, concept]);
        }
    }
    Ok(sort_by_label(table))
}

/// `(uri, label, nonPropExt)` for every `euvoc:FileType`, plus the
/// non-proprietary (`nonPropExt = "true"`) and machine-readable subsets.
pub fn extract_file_types(rdf_xml: &str, source_url: &str) -> Result<FileTypeTables> {
    let graph = parse_rdf_xml(rdf_xml, source_url)?;
    let rows = graph.select(
        "SELECT ?type ?nonprop WHERE {\n\
         \x20   ?type a euvoc:FileType .\n\
         \x20   OPTIONAL { ?type euvoc:nonPropExt ?nonprop }\n\
         }\n\
         ORDER BY ?type ?nonprop",
    )?;

    let mut flags: BTreeMap<String, String> = BTreeMap::new();
    for row in rows {
        let Some(uri) = row.get("type") else {
            continue;
        };
        let flag = row
            .get("nonprop")
            .cloned()
            .unwrap_or_else(|| "false".to_string());
        flags.entry(uri.clone()).or_insert(flag);
    }

    let mut file_types = BTreeSet::new();
    let mut non_proprietary = BTreeSet::new();
    let mut machine_readable = BTreeSet::new();
    for (uri, flag) in flags {
        let label = last_path_segment(&uri).to_string();
        if !keeps_entry(&uri, &label, source_url) {
            continue;
        }
        machine_readable.insert(vec![uri.clone(), label.clone()]);
        if flag == "true" {
            non_proprietary.insert(vec![uri.clone(), label.clone()]);
        }
        file_types.insert(vec![uri, label, flag]);
    }

    Ok(FileTypeTables {
        file_types: sort_by_label(file_types),
        non_proprietary: sort_by_label(non_proprietary),
        machine_readable: sort_by_label(machine_readable),
    })
}

/// `(http://www.iana.org/assignments/media-types/<file>, <file>)` for every
/// registry record carrying a `file` element.
pub fn extract_media_types(xml: &str, source_url: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let source_name = last_path_segment(source_url);
    let mut table = BTreeSet::new();
    let mut in_record = false;
    let mut in_file = false;
    let mut file = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"record" => {
                    in_record = true;
                    file.clear();
                }
                b"file" if in_record => in_file = true,
                _ => {}
            },
            Ok(Event::Text(e)) if in_file => {
                let text = e
                    .unescape()
                    .map_err(|err| VocabularyError::Xml(err.to_string()))?;
                file.push_str(&text);
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"file" => in_file = false,
                b"record" => {
                    in_record = false;
                    let name = file.trim();
                    if !name.is_empty() && name != source_name {
                        table.insert(vec![
                            format!("http://www.iana.org/assignments/media-types/{name}"),
                            name.to_string(),
                        ]);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(VocabularyError::Xml(err.to_string())),
            _ => {}
        }
    }
    Ok(sort_by_label(table))
}

fn parse_rdf_xml(rdf_xml: &str, source_url: &str) -> Result<CatalogGraph> {
    let graph = CatalogGraph::empty()?;
    graph.load(RdfFormat::RdfXml, Some(source_url), rdf_xml.as_bytes())?;
    Ok(graph)
}

fn keeps_entry(uri: &str, label: &str, source_url: &str) -> bool {
    uri != source_url && label != last_path_segment(source_url)
}

fn sort_by_label(rows: BTreeSet<Vec<String>>) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = rows.into_iter().collect();
    rows.sort_by(|a, b| a.get(1).cmp(&b.get(1)));
    rows
}

fn write_rows(path: &Path, rows: Vec<Vec<String>>) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

use async_trait::async_trait;
use mqa_core::CatalogGraph;
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use crate::errors::{FetchError, Result};
use crate::fetcher::CatalogFetcher;
use crate::options::FetchOptions;

/// Fetches a catalog endpoint that pages its output as a `hydra:PagedCollection`.
///
/// The first page is the configured URL; pages `2, 3, …` add a `page`
/// query parameter until `hydra:itemsPerPage` times the number of pages
/// reaches `hydra:totalItems`. Every page is merged into one graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct HydraFetcher;

#[async_trait]
impl CatalogFetcher for HydraFetcher {
    fn kind(&self) -> &'static str {
        "hydra"
    }

    async fn fetch(&self, opts: &FetchOptions) -> Result<CatalogGraph> {
        let client = build_client(opts)?;
        fetch_paged(&client, opts, &opts.url, |_, body| Ok(body)).await
    }
}

/// Fetches a CKAN `dcat_catalog_search` result, where every page is a JSON
/// envelope whose `result` field carries the serialized catalog.
///
/// `FetchOptions::url` is the CKAN site root.
#[derive(Debug, Clone)]
pub struct CkanSearchFetcher {
    pub keyword: String,
}

impl CkanSearchFetcher {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }

    pub fn search_url(&self, site: &str) -> Result<String> {
        let mut url = parse_url(site)?
            .join("api/3/action/dcat_catalog_search")
            .map_err(|_| FetchError::InvalidUrl(site.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", &self.keyword)
            .append_pair("format", "rdf");
        Ok(url.into())
    }
}

#[async_trait]
impl CatalogFetcher for CkanSearchFetcher {
    fn kind(&self) -> &'static str {
        "ckan_search"
    }

    async fn fetch(&self, opts: &FetchOptions) -> Result<CatalogGraph> {
        let client = build_client(opts)?;
        let search_url = self.search_url(&opts.url)?;
        fetch_paged(&client, opts, &search_url, search_result).await
    }
}

/// `base` with a `page=<page>` query parameter appended.
pub fn page_url(base: &str, page: u32) -> Result<String> {
    let mut url = parse_url(base)?;
    url.query_pairs_mut().append_pair("page", &page.to_string());
    Ok(url.into())
}

fn parse_url(value: &str) -> Result<Url> {
    Url::parse(value).map_err(|_| FetchError::InvalidUrl(value.to_string()))
}

fn build_client(opts: &FetchOptions) -> Result<Client> {
    Ok(Client::builder()
        .timeout(opts.timeout)
        .user_agent(opts.user_agent.clone())
        .build()?)
}

async fn fetch_paged<F>(
    client: &Client,
    opts: &FetchOptions,
    base_url: &str,
    extract: F,
) -> Result<CatalogGraph>
where
    F: Fn(&str, String) -> Result<String> + Send + Sync,
{
    parse_url(base_url)?;
    let graph = CatalogGraph::empty()?;

    let body = get_body(client, base_url).await?;
    graph.load(opts.format, Some(base_url), extract(base_url, body)?.as_bytes())?;

    let Some((items_per_page, total_items)) = paging(&graph)? else {
        info!(url = base_url, pages = 1, triples = graph.len()?, "catalog fetched");
        return Ok(graph);
    };
    debug!(items_per_page, total_items, "paged collection detected");

    let mut fetched = items_per_page;
    let mut page = 2u32;
    while items_per_page > 0 && fetched < total_items {
        if opts.max_pages.is_some_and(|max| page > max) {
            warn!(url = base_url, page, total_items, "page limit reached");
            break;
        }
        let url = page_url(base_url, page)?;
        let body = get_body(client, &url).await?;
        graph.load(opts.format, Some(&url), extract(&url, body)?.as_bytes())?;
        fetched += items_per_page;
        page += 1;
    }

    info!(
        url = base_url,
        pages = page - 1,
        triples = graph.len()?,
        "catalog fetched"
    );
    Ok(graph)
}

async fn get_body(client: &Client, url: &str) -> Result<String> {
    debug!(url, "fetching catalog page");
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

/// `(itemsPerPage, totalItems)` of the paged collection, if the graph declares one.
fn paging(graph: &CatalogGraph) -> Result<Option<(u64, u64)>> {
    let rows = graph.select(
        "SELECT ?items ?total WHERE {\n\
         \x20   ?collection a hydra:PagedCollection ;\n\
         \x20       hydra:itemsPerPage ?items ;\n\
         \x20       hydra:totalItems ?total .\n\
         }",
    )?;
    let Some(row) = rows.last() else {
        return Ok(None);
    };
    let items = row.get("items").and_then(|value| value.trim().parse().ok());
    let total = row.get("total").and_then(|value| value.trim().parse().ok());
    Ok(items.zip(total))
}

fn search_result(url: &str, body: String) -> Result<String> {
    let payload: serde_json::Value =
        serde_json::from_str(&body).map_err(|err| FetchError::Payload {
            url: url.to_string(),
            message: err.to_string(),
        })?;
    payload
        .get("result")
        .and_then(|result| result.as_str())
        .map(str::to_string)
        .ok_or_else(|| FetchError::Payload {
            url: url.to_string(),
            message: "missing string field 'result'".to_string(),
        })
}

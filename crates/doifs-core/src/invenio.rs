//! InvenioRDM: endpoint discovery and file listing.
//!
//! Generic installations have no fixed hostname, so the API endpoint is
//! discovered from the landing page. Two strategies run in order and the
//! first candidate that validates wins:
//!
//! 1. [`DiscoveryStrategy::LinkHeader`]: a `rel=linkset` link in the `Link` header.
//! 2. [`DiscoveryStrategy::PathGuess`]: a record ID read off the landing-page path.
//!
//! Zenodo runs on Invenio and shares [`list_files`] and [`validate_endpoint`].

use std::fmt;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use reqwest::header::LINK;
use url::Url;

use crate::api::{InvenioFilesResponse, InvenioRecordResponse};
use crate::entry::{FileEntry, dedupe_entries, parse_modified, strip_md5_prefix};
use crate::error::{DoiError, Result};
use crate::http::HttpClient;
use crate::link_header::parse_link_header;

static RECORD_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/records?/(.+)").expect("record path regex is valid"));

const LINKSET_REL: &str = "linkset";
const LINKSET_TYPE: &str = "application/linkset+json";

/// What the discovery strategies get to look at.
#[derive(Debug, Clone)]
pub struct LandingPage {
    /// URL after redirects.
    pub final_url: Url,
    /// All `Link` header values, comma-joined.
    pub link_header: String,
}

/// Ways of proposing a candidate API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    LinkHeader,
    PathGuess,
}

/// Strategies in the order they are tried.
pub const DISCOVERY_STRATEGIES: [DiscoveryStrategy; 2] =
    [DiscoveryStrategy::LinkHeader, DiscoveryStrategy::PathGuess];

impl DiscoveryStrategy {
    /// Propose a candidate endpoint, or `None` to skip.
    pub fn candidate(&self, page: &LandingPage) -> Option<Url> {
        match self {
            DiscoveryStrategy::LinkHeader => parse_link_header(&page.link_header)
                .into_iter()
                .filter(|link| link.rel == LINKSET_REL && link.media_type == LINKSET_TYPE)
                .find_map(|link| page.final_url.join(&link.href).ok()),
            DiscoveryStrategy::PathGuess => {
                let captures = RECORD_PATH_RE.captures(page.final_url.path())?;
                let record_id = captures.get(1)?.as_str();
                page.final_url
                    .join(&format!("/api/records/{}", record_id))
                    .ok()
            }
        }
    }
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryStrategy::LinkHeader => f.write_str("link header"),
            DiscoveryStrategy::PathGuess => f.write_str("record path"),
        }
    }
}

/// Discover the record API endpoint behind an Invenio landing page.
pub async fn resolve_endpoint(client: &HttpClient, resolved: &Url) -> Result<Url> {
    debug!("invenio landing page = {}", resolved);
    let page = fetch_landing_page(client, resolved).await;

    for strategy in DISCOVERY_STRATEGIES {
        let Some(candidate) = strategy.candidate(&page) else {
            debug!("{} strategy: no candidate", strategy);
            continue;
        };
        match validate_endpoint(client, &candidate).await {
            Ok(endpoint) => {
                debug!("{} strategy: endpoint = {}", strategy, endpoint);
                return Ok(endpoint);
            }
            Err(e) => warn!("{} strategy: candidate {} rejected: {}", strategy, candidate, e),
        }
    }

    Err(DoiError::EndpointDiscovery {
        url: resolved.to_string(),
        reason: "no discovery strategy produced a valid Invenio record API".to_string(),
    })
}

/// GET the landing page. On failure the path guess still runs on `resolved`.
async fn fetch_landing_page(client: &HttpClient, resolved: &Url) -> LandingPage {
    match client.get("fetch landing page", resolved).await {
        Ok(response) => {
            let link_header = response
                .headers()
                .get_all(LINK)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect::<Vec<_>>()
                .join(", ");
            LandingPage {
                final_url: response.url().clone(),
                link_header,
            }
        }
        Err(e) => {
            warn!("could not fetch landing page: {}", e);
            LandingPage {
                final_url: resolved.clone(),
                link_header: String::new(),
            }
        }
    }
}

/// Fetch a candidate as a record and return its advertised `links.self`.
pub async fn validate_endpoint(client: &HttpClient, candidate: &Url) -> Result<Url> {
    let record: InvenioRecordResponse = client
        .get_json("validate record endpoint", candidate)
        .await
        .map_err(|e| match e {
            DoiError::Decode { url, message } => DoiError::EndpointDiscovery { url, reason: message },
            other => other,
        })?;
    let self_link = record.links.self_link;
    if self_link.is_empty() {
        return Err(DoiError::EndpointDiscovery {
            url: candidate.to_string(),
            reason: "response has no links.self".to_string(),
        });
    }
    Url::parse(&self_link).map_err(|e| DoiError::EndpointDiscovery {
        url: candidate.to_string(),
        reason: format!("invalid links.self '{}': {}", self_link, e),
    })
}

/// `<endpoint>/files`
pub fn files_url(endpoint: &Url) -> Result<Url> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| DoiError::Config(format!("endpoint '{}' cannot have a path", endpoint)))?
        .pop_if_empty()
        .push("files");
    Ok(url)
}

/// List the files of the record at `endpoint`.
pub async fn list_files(client: &HttpClient, endpoint: &Url) -> Result<Vec<FileEntry>> {
    let url = files_url(endpoint)?;
    let response: InvenioFilesResponse = client.get_json("list files", &url).await?;

    let mut entries = Vec::with_capacity(response.entries.len());
    for file in response.entries {
        let content_url = match url.join(&file.links.content) {
            Ok(u) if !file.links.content.is_empty() => u,
            _ => {
                warn!("skipping '{}': no usable content link", file.key);
                continue;
            }
        };
        entries.push(FileEntry {
            modified: parse_modified(&file.updated, "updated time"),
            checksum: strip_md5_prefix(&file.checksum).to_string(),
            remote_path: file.key,
            content_url: content_url.to_string(),
            size: file.size,
            content_type: file.mimetype,
        });
    }
    Ok(dedupe_entries(entries))
}

//! Zenodo endpoint resolution.
//!
//! Zenodo DOIs embed the record ID (`10.5281/zenodo.<id>`), so no discovery
//! is needed. Listing goes through [`crate::invenio::list_files`].

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use url::Url;

use crate::error::{DoiError, Result};
use crate::http::HttpClient;
use crate::invenio;

static RECORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"zenodo[.](.+)").expect("zenodo record regex is valid"));

/// The record ID embedded in a Zenodo DOI.
pub fn record_id(doi: &str) -> Result<&str> {
    RECORD_RE
        .captures(doi)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| DoiError::MalformedDoi {
            doi: doi.to_string(),
            reason: "expected a 'zenodo.<record id>' suffix".to_string(),
        })
}

/// Build `<host>/api/records/<id>` and return the record's `links.self`.
pub async fn resolve_endpoint(client: &HttpClient, resolved: &Url, doi: &str) -> Result<Url> {
    debug!("zenodo landing page = {}", resolved);
    let id = record_id(doi)?;
    let candidate = resolved
        .join(&format!("/api/records/{}", id))
        .map_err(|e| DoiError::EndpointDiscovery {
            url: resolved.to_string(),
            reason: e.to_string(),
        })?;
    invenio::validate_endpoint(client, &candidate).await
}

//! DOI normalisation and handle resolution.
//!
//! Reference: <https://www.doi.org/the-identifier/resources/factsheets/doi-resolution-documentation>

use log::debug;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde_json::Value;
use url::Url;

use crate::error::{DoiError, Result};
use crate::http::HttpClient;
use crate::json_ext::JsonExt;

/// Base URL of the doi.org handle API.
pub const DOI_RESOLVER_API_URL: &str = "https://doi.org/api";

/// Characters escaped when a DOI is placed in the handle API path. `/` stays.
const HANDLE_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Turn user input into a bare DOI.
///
/// - `10.1000/182` -> `10.1000/182`
/// - `doi:10.1000/182` -> `10.1000/182`
/// - `https://doi.org/10.1000/182` -> `10.1000/182`
///
/// Anything else is returned unchanged.
pub fn normalize(input: &str) -> String {
    let Ok(parsed) = Url::parse(input) else {
        return input.to_string();
    };
    if parsed.scheme() == "doi" {
        let rest = input.trim().split_once(':').map_or("", |(_, rest)| rest);
        return rest.trim_start_matches('/').to_string();
    }
    if parsed.host_str().is_some_and(|h| h.ends_with("doi.org")) {
        let path = parsed.path().trim_start_matches('/');
        return percent_decode_str(path).decode_utf8_lossy().into_owned();
    }
    input.to_string()
}

/// Client for the handle API.
#[derive(Debug, Clone)]
pub struct DoiResolver {
    client: HttpClient,
    api_url: String,
}

impl DoiResolver {
    pub fn new(client: HttpClient, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    /// The handle API URL for index 1 of `doi`.
    pub fn handle_url(&self, doi: &str) -> Result<Url> {
        let raw = format!(
            "{}/handles/{}?index=1",
            self.api_url.trim_end_matches('/'),
            utf8_percent_encode(doi, HANDLE_PATH)
        );
        Url::parse(&raw).map_err(|e| DoiError::Config(format!("bad resolver URL '{}': {}", raw, e)))
    }

    /// Resolve an already normalised DOI to its target URL.
    pub async fn resolve(&self, doi: &str) -> Result<Url> {
        let url = self.handle_url(doi)?;
        let response: Value = match self.client.get_json("resolve DOI", &url).await {
            Ok(v) => v,
            Err(DoiError::NotFound(_)) => {
                return Err(resolution(doi, "handle not found (HTTP 404)"));
            }
            Err(e) => return Err(e),
        };

        let code = response.get_i64("responseCode");
        if code != Some(1) {
            return Err(resolution(
                doi,
                &format!("error code {}", code.map_or("missing".to_string(), |c| c.to_string())),
            ));
        }

        let target = target_url_value(&response, doi)?;
        let resolved = Url::parse(target)
            .map_err(|e| resolution(doi, &format!("invalid URL '{}': {}", target, e)))?;
        debug!("resolved DOI {} to {}", doi, resolved);
        Ok(resolved)
    }
}

/// The string value of the first `URL`-typed handle value.
fn target_url_value<'a>(response: &'a Value, doi: &str) -> Result<&'a str> {
    let values = response.get_array("values").map(Vec::as_slice).unwrap_or_default();
    let value = values
        .iter()
        .find(|v| {
            v.get_str("type") == Some("URL")
                && v.get_path("data/format").and_then(Value::as_str) == Some("string")
        })
        .ok_or_else(|| resolution(doi, "no URL value in handle record"))?;
    value
        .get_path("data/value")
        .and_then(Value::as_str)
        .ok_or_else(|| resolution(doi, "incorrect response format"))
}

fn resolution(doi: &str, reason: &str) -> DoiError {
    DoiError::Resolution {
        doi: doi.to_string(),
        reason: reason.to_string(),
    }
}

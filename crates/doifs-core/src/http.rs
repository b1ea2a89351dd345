//! Thin wrapper over `reqwest` shared by the resolver, discovery and listers.
//!
//! Maps transport failures and non-2xx statuses onto [`DoiError`], tagging
//! each with the operation name and URL. Nothing here retries.

use log::debug;
use reqwest::header::{ACCEPT, RANGE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{DoiError, Result};

/// A byte range for partial content requests.
///
/// `count` of `None` reads to the end of the file. A zero count is an empty
/// range and never reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub count: Option<u64>,
}

impl ByteRange {
    /// Build a range from an offset and an optional byte count.
    pub fn from_offset(offset: u64, count: Option<u64>) -> Self {
        ByteRange {
            start: offset,
            count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == Some(0)
    }

    /// `Range` header value. The inclusive end saturates at `u64::MAX`.
    pub fn header_value(&self) -> String {
        match self.count {
            Some(n) if n > 0 => {
                format!("bytes={}-{}", self.start, self.start.saturating_add(n - 1))
            }
            _ => format!("bytes={}-", self.start),
        }
    }
}

/// Shared HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| DoiError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// GET `url`, failing on transport errors and non-2xx statuses.
    pub async fn get(&self, operation: &'static str, url: &Url) -> Result<Response> {
        self.send(operation, url, None, None).await
    }

    /// GET `url` as JSON and decode it into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &Url,
    ) -> Result<T> {
        let response = self
            .send(operation, url, Some("application/json"), None)
            .await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| DoiError::transport(operation, url.as_str(), e))?;
        serde_json::from_slice(&body).map_err(|e| DoiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// GET `url` with an optional `Range` header.
    pub async fn get_range(
        &self,
        operation: &'static str,
        url: &Url,
        range: Option<ByteRange>,
    ) -> Result<Response> {
        self.send(operation, url, None, range).await
    }

    async fn send(
        &self,
        operation: &'static str,
        url: &Url,
        accept: Option<&str>,
        range: Option<ByteRange>,
    ) -> Result<Response> {
        debug!("{}: GET {}", operation, url);
        let mut request = self.client.get(url.clone());
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        if let Some(range) = range {
            request = request.header(RANGE, range.header_value());
        }
        let response = request
            .send()
            .await
            .map_err(|e| DoiError::transport(operation, url.as_str(), e))?;
        check_status(operation, url, response)
    }
}

fn check_status(operation: &'static str, url: &Url, response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(DoiError::NotFound(url.to_string()));
    }
    if !status.is_success() {
        return Err(DoiError::transport(
            operation,
            url.as_str(),
            format!("HTTP {}", status),
        ));
    }
    Ok(response)
}

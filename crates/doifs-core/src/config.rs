//! Remote options and HTTP client settings.

use serde::{Deserialize, Serialize};

use crate::doi::DOI_RESOLVER_API_URL;
use crate::error::{DoiError, Result};
use crate::provider::Provider;

/// Options for one DOI remote, keyed as they appear in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// The DOI or a doi.org URL for it.
    pub doi: String,
    /// Force a provider instead of sniffing the resolved host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
}

impl Options {
    pub fn new(doi: impl Into<String>) -> Self {
        Self {
            doi: doi.into(),
            provider: None,
        }
    }

    /// Option keys accepted by [`Options::apply`].
    pub fn field_paths() -> &'static [&'static str] {
        &["doi", "provider"]
    }

    /// Set one option by key. An empty `provider` clears the override.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "doi" => {
                let doi = value.trim();
                if doi.is_empty() {
                    return Err(DoiError::Config("doi cannot be empty".to_string()));
                }
                self.doi = doi.to_string();
            }
            "provider" => {
                self.provider = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.parse()?)
                };
            }
            other => {
                return Err(DoiError::Config(format!(
                    "unknown option '{}' (expected one of: {})",
                    other,
                    Self::field_paths().join(", ")
                )));
            }
        }
        self.validate()
    }

    /// Apply `key=value` pairs in order over a copy of `self`.
    pub fn with_pairs<'a, I>(&self, pairs: I) -> Result<Options>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut next = self.clone();
        for (key, value) in pairs {
            next.apply(key, value)?;
        }
        Ok(next)
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.doi.trim().is_empty() {
            return Err(DoiError::Config("doi is required".to_string()));
        }
        if let Some(provider) = self.provider
            && !provider.is_overridable()
        {
            return Err(DoiError::Config(format!(
                "provider '{}' cannot be forced, it is found by discovery",
                provider
            )));
        }
        Ok(())
    }
}

/// Split a `key=value` option argument.
pub fn parse_pair(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| DoiError::Config(format!("expected key=value, got '{}'", raw)))
}

/// Settings shared by every remote: where handles resolve and how we identify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_resolver_url")]
    pub resolver_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_resolver_url() -> String {
    DOI_RESOLVER_API_URL.to_string()
}

fn default_user_agent() -> String {
    format!("doifs/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            resolver_url: default_resolver_url(),
            user_agent: default_user_agent(),
        }
    }
}

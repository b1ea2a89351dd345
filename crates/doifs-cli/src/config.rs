//! CLI configuration: the TOML file listing named remotes.
//!
//! Precedence for the config file:
//! 1. `--config` flag
//! 2. `$DOIFS_HOME/config.toml`
//! 3. `~/.doifs/config.toml`
//!
//! A missing file is an empty config, not an error.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use dirs_next::home_dir;
use doifs_core::{ClientConfig, Options, Provider};
use serde::Deserialize;

/// Remote name bound by `--doi`.
pub const INLINE_REMOTE: &str = "doi";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Handle API base URL.
    #[serde(default)]
    pub resolver_url: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub remotes: BTreeMap<String, Options>,
}

impl CliConfig {
    /// Add the `--doi` remote, replacing a configured one of the same name.
    pub fn add_inline(&mut self, doi: &str, provider: Option<&str>) -> io::Result<()> {
        let mut options = Options::new(doi);
        if let Some(provider) = provider {
            options.provider = Some(provider.parse::<Provider>()?);
        }
        self.remotes.insert(INLINE_REMOTE.to_string(), options);
        Ok(())
    }

    /// Validated options for a named remote.
    pub fn remote(&self, name: &str) -> io::Result<Options> {
        let options = self.remotes.get(name).cloned().ok_or_else(|| {
            let known: Vec<&str> = self.remotes.keys().map(String::as_str).collect();
            io::Error::new(
                ErrorKind::NotFound,
                format!(
                    "no remote named '{}' (configured: {})",
                    name,
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                ),
            )
        })?;
        options.validate()?;
        Ok(options)
    }

    /// Client settings, with `resolver_override` taking precedence.
    pub fn client_config(&self, resolver_override: Option<&str>) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(url) = resolver_override.or(self.resolver_url.as_deref()) {
            config.resolver_url = url.to_string();
        }
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        config
    }
}

/// `$DOIFS_HOME`, else `~/.doifs`.
pub fn doifs_home() -> io::Result<PathBuf> {
    if let Ok(home) = std::env::var("DOIFS_HOME") {
        return Ok(PathBuf::from(home));
    }
    let home =
        home_dir().ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Home directory not found"))?;
    Ok(home.join(".doifs"))
}

/// The config file to read.
pub fn config_path(path_override: Option<&Path>) -> io::Result<PathBuf> {
    match path_override {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(doifs_home()?.join("config.toml")),
    }
}

/// Load a config file, treating a missing file as empty.
pub fn load_cli_config(path: &Path) -> io::Result<CliConfig> {
    if !path.exists() {
        log::debug!("no config at {}", path.display());
        return Ok(CliConfig::default());
    }
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        io::Error::new(
            ErrorKind::InvalidData,
            format!("Failed to parse {}: {}", path.display(), e),
        )
    })
}

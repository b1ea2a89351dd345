//! A DOI session: one bound provider and endpoint, served as a read-only tree.
//!
//! ```text
//! Options -> normalize -> resolve (handle API) -> provider::resolve_endpoint
//!         -> Binding { provider, endpoint, cache }
//! ```
//!
//! The binding is swapped whole by [`DoiSession::set`]. Operations take a
//! snapshot of it first, so a reconfigure never mixes the old endpoint with
//! the new cache.

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use log::{debug, info};
use serde_json::Value;
use url::Url;

use crate::cache::{FILES_KEY, Listing, MetadataCache};
use crate::config::{ClientConfig, Options};
use crate::dataverse;
use crate::doi::{DoiResolver, normalize};
use crate::entry::{DirItem, FileEntry, SUPPORTED_HASHES};
use crate::error::{DoiError, Result};
use crate::http::{ByteRange, HttpClient};
use crate::provider::{self, Provider, ResolvedEndpoint};

/// Names accepted by [`DoiSession::command`].
pub const COMMANDS: &[&str] = &["show-metadata", "set"];

/// Content stream returned by [`DoiSession::open`].
pub type ContentStream = BoxStream<'static, Result<Vec<u8>>>;

/// Everything that changes together on reconfigure.
struct Binding {
    options: Options,
    doi: String,
    endpoint: ResolvedEndpoint,
    cache: MetadataCache,
}

impl Binding {
    async fn connect(client: &HttpClient, resolver: &DoiResolver, options: Options) -> Result<Self> {
        options.validate()?;
        // config files can carry padded values
        let doi = normalize(options.doi.trim());
        let resolved = resolver.resolve(&doi).await?;
        let endpoint =
            provider::resolve_endpoint(client, &resolved, &doi, options.provider).await?;
        Ok(Self {
            options,
            doi,
            endpoint,
            cache: MetadataCache::new(),
        })
    }

    async fn files(&self, client: &HttpClient) -> Result<Listing> {
        let provider = self.endpoint.provider;
        let url = &self.endpoint.url;
        self.cache
            .get_or_try_insert_with(FILES_KEY, || provider.list_files(client, url))
            .await
    }
}

/// A connected DOI remote.
pub struct DoiSession {
    name: String,
    root: String,
    client: HttpClient,
    resolver: DoiResolver,
    binding: RwLock<Arc<Binding>>,
}

impl DoiSession {
    /// Resolve `options` and bind a session rooted at `root`.
    ///
    /// The flag is `true` when `root` names a file. The session is then
    /// rooted at that file's parent directory.
    pub async fn connect(
        name: &str,
        root: &str,
        options: Options,
        client_config: &ClientConfig,
    ) -> Result<(Self, bool)> {
        let client = HttpClient::new(&client_config.user_agent)?;
        let resolver = DoiResolver::new(client.clone(), client_config.resolver_url.clone());
        let binding = Binding::connect(&client, &resolver, options).await?;

        let mut root = root.trim_matches('/').to_string();
        let is_file = match binding.endpoint.provider {
            Provider::Dataverse => binding
                .files(&client)
                .await?
                .iter()
                .any(|e| e.remote_path == root),
            Provider::Zenodo | Provider::Invenio => !root.is_empty(),
        };
        if is_file {
            root = parent_dir(&root).to_string();
        }
        info!(
            "connected '{}' to DOI {} ({}), root = '{}'",
            name, binding.doi, binding.endpoint.provider, root
        );

        let session = Self {
            name: name.to_string(),
            root,
            client,
            resolver,
            binding: RwLock::new(Arc::new(binding)),
        };
        Ok((session, is_file))
    }

    fn snapshot(&self) -> Arc<Binding> {
        let guard = self.binding.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session root inside the dataset, without leading or trailing slashes.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn doi(&self) -> String {
        self.snapshot().doi.clone()
    }

    pub fn provider(&self) -> Provider {
        self.snapshot().endpoint.provider
    }

    pub fn endpoint(&self) -> Url {
        self.snapshot().endpoint.url.clone()
    }

    pub fn options(&self) -> Options {
        self.snapshot().options.clone()
    }

    /// Modification times are reported to the second.
    pub fn precision(&self) -> Duration {
        Duration::from_secs(1)
    }

    pub fn hashes(&self) -> &'static [&'static str] {
        SUPPORTED_HASHES
    }

    /// The full flat entry set, dataset-relative. Fetched once per binding.
    pub async fn list_files(&self) -> Result<Listing> {
        self.snapshot().files(&self.client).await
    }

    /// Immediate children of `dir`, relative to the session root.
    pub async fn list(&self, dir: &str) -> Result<Vec<DirItem>> {
        let binding = self.snapshot();
        let dir = dir.trim_matches('/');
        let full = join_path(&self.root, dir);
        let entries = binding.files(&self.client).await?;

        let items = match binding.endpoint.provider {
            Provider::Zenodo | Provider::Invenio => {
                if !full.is_empty() {
                    return Err(DoiError::NotFound(format!("directory '{}'", dir)));
                }
                entries.iter().cloned().map(DirItem::File).collect()
            }
            Provider::Dataverse => {
                if !dataverse::is_directory(&entries, &full) {
                    return Err(DoiError::NotFound(format!("directory '{}'", dir)));
                }
                dataverse::synthesize_listing(&entries, &full)
            }
        };
        debug!("list '{}': {} items", full, items.len());
        Ok(items
            .into_iter()
            .map(|item| self.relative_item(item))
            .collect())
    }

    /// Look up one file by its root-relative path.
    pub async fn stat(&self, remote: &str) -> Result<FileEntry> {
        let binding = self.snapshot();
        let full = join_path(&self.root, remote.trim_matches('/'));
        let entries = binding.files(&self.client).await?;
        entries
            .iter()
            .find(|e| e.remote_path == full)
            .map(|e| self.relative_entry(e.clone()))
            .ok_or_else(|| DoiError::NotFound(format!("object '{}'", remote)))
    }

    /// Stream the content of `entry`, optionally a byte range of it.
    pub async fn open(&self, entry: &FileEntry, range: Option<ByteRange>) -> Result<ContentStream> {
        let url = Url::parse(&entry.content_url)
            .map_err(|e| DoiError::transport("open", entry.content_url.as_str(), e))?;
        debug!("open {} range {:?}", url, range);
        if range.is_some_and(|r| r.is_empty()) {
            return Ok(stream::empty().boxed());
        }
        let response = self.client.get_range("open", &url, range).await?;
        let source = url.to_string();
        let stream = response.bytes_stream().map(move |chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| DoiError::transport("read", source.as_str(), e))
        });
        Ok(stream.boxed())
    }

    /// Collect [`DoiSession::open`] into memory.
    pub async fn read(&self, entry: &FileEntry, range: Option<ByteRange>) -> Result<Vec<u8>> {
        let mut stream = self.open(entry, range).await?;
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk?);
        }
        Ok(data)
    }

    /// The raw JSON the bound endpoint returns.
    pub async fn show_metadata(&self) -> Result<Value> {
        let binding = self.snapshot();
        self.client
            .get_json("show metadata", &binding.endpoint.url)
            .await
    }

    /// Re-resolve with `pairs` applied over the current options.
    ///
    /// On failure the current binding stays in place.
    pub async fn set(&self, pairs: &[(String, String)]) -> Result<()> {
        let current = self.snapshot();
        let options = current
            .options
            .with_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        let next = Binding::connect(&self.client, &self.resolver, options).await?;

        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        info!(
            "'{}' updated config values: {} (now {} at {})",
            self.name,
            keys.join(", "),
            next.endpoint.provider,
            next.endpoint.url
        );
        let mut guard = self.binding.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(next);
        Ok(())
    }

    /// Run a backend command by name. `set` returns `null`.
    pub async fn command(&self, name: &str, pairs: &[(String, String)]) -> Result<Value> {
        match name {
            "show-metadata" => self.show_metadata().await,
            "set" => {
                self.set(pairs).await?;
                Ok(Value::Null)
            }
            other => Err(DoiError::CommandNotFound(other.to_string())),
        }
    }

    fn relative_entry(&self, entry: FileEntry) -> FileEntry {
        FileEntry {
            remote_path: relative_to(&self.root, &entry.remote_path).to_string(),
            ..entry
        }
    }

    fn relative_item(&self, item: DirItem) -> DirItem {
        match item {
            DirItem::File(entry) => DirItem::File(self.relative_entry(entry)),
            DirItem::Directory { path } => DirItem::Directory {
                path: relative_to(&self.root, &path).to_string(),
            },
        }
    }
}

impl fmt::Display for DoiSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DOI {}", self.snapshot().doi)
    }
}

fn join_path(root: &str, rel: &str) -> String {
    match (root.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (false, true) => root.to_string(),
        (false, false) => format!("{}/{}", root, rel),
    }
}

fn relative_to<'a>(root: &str, path: &'a str) -> &'a str {
    if root.is_empty() {
        return path;
    }
    path.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

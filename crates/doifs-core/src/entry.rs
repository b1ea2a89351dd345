//! The uniform file model every provider lister produces.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;

/// Modification time used when a provider gives none or it fails to parse.
pub const UNSET_TIME: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Hash kinds providers publish. Everything else is unsupported.
pub const SUPPORTED_HASHES: &[&str] = &["md5"];

/// One file in a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// POSIX-style path relative to the dataset (or session) root.
    pub remote_path: String,
    /// Absolute URL the content is downloaded from.
    pub content_url: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    /// Possibly empty.
    pub content_type: String,
    /// MD5 hex digest without any `md5:` prefix; empty when unknown.
    pub checksum: String,
}

impl FileEntry {
    /// Final path component.
    pub fn name(&self) -> &str {
        self.remote_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.remote_path)
    }

    pub fn has_modified_time(&self) -> bool {
        self.modified != UNSET_TIME
    }

    /// The digest of the given kind, `None` if the kind is unsupported.
    pub fn hash(&self, kind: &str) -> Option<&str> {
        kind.eq_ignore_ascii_case("md5")
            .then_some(self.checksum.as_str())
    }
}

/// One result of listing a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DirItem {
    File(FileEntry),
    /// A directory synthesised from file paths. Carries no modification time.
    Directory { path: String },
}

impl DirItem {
    pub fn path(&self) -> &str {
        match self {
            DirItem::File(entry) => &entry.remote_path,
            DirItem::Directory { path } => path,
        }
    }

    /// Final path component.
    pub fn name(&self) -> &str {
        match self {
            DirItem::File(entry) => entry.name(),
            DirItem::Directory { path } => path.rsplit('/').next().unwrap_or(path),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, DirItem::Directory { .. })
    }
}

/// Parse an RFC 3339 timestamp, falling back to [`UNSET_TIME`] with a warning.
pub fn parse_modified(raw: &str, what: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => t.with_timezone(&Utc),
        Err(e) => {
            warn!("could not parse {} '{}': {}", what, raw, e);
            UNSET_TIME
        }
    }
}

/// Drop entries whose `remote_path` was already seen, keeping the first.
pub fn dedupe_entries(entries: Vec<FileEntry>) -> Vec<FileEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| {
            let fresh = seen.insert(entry.remote_path.clone());
            if !fresh {
                warn!("duplicate remote path '{}' dropped", entry.remote_path);
            }
            fresh
        })
        .collect()
}

/// Strip the literal `md5:` prefix Invenio puts on checksums.
pub fn strip_md5_prefix(checksum: &str) -> &str {
    checksum.strip_prefix("md5:").unwrap_or(checksum)
}

//! VFS data types shared across the module.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Kind of entry in the VFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VfsEntryKind {
    File,
    Directory,
}

/// Metadata for a VFS entry.
#[derive(Debug, Clone, Serialize)]
pub struct VfsMetadata {
    pub size: u64,
    /// `None` when the provider gave no usable time, and for directories.
    pub modified: Option<DateTime<Utc>>,
    pub kind: VfsEntryKind,
    pub content_type: Option<String>,
}

/// A single entry returned by a directory listing.
///
/// Name, kind and size only. Callers who need the rest follow up with
/// `VfsBackend::metadata()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VfsEntry {
    pub name: String,
    pub kind: VfsEntryKind,
    /// Zero for directories.
    pub size: u64,
}

/// What a backend can do, as reported to the host.
#[derive(Debug, Clone, Serialize)]
pub struct BackendInfo {
    /// Human-readable description, e.g. `DOI 10.5281/zenodo.15063252`.
    pub description: String,
    /// Granularity of reported modification times.
    pub precision: Duration,
    /// Hash kinds `VfsBackend::hash` can answer.
    pub hashes: Vec<String>,
    pub read_only: bool,
    /// Names accepted by `VfsBackend::command`.
    pub commands: Vec<String>,
}

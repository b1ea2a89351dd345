//! VFS backend trait: the capability interface a mounted remote implements.
//!
//! # Dyn-compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of `impl Future` so that
//! `Box<dyn VfsBackend>` works and `Vfs` can select a backend at runtime by
//! remote name.
//!
//! All input references share a single lifetime `'a` so the returned
//! future can borrow from both `&self` and any path arguments.

use std::future::Future;
use std::io;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::path::VfsPath;
use super::types::{BackendInfo, VfsEntry, VfsMetadata};
use crate::http::ByteRange;

/// Boxed, Send future: the return type for all backend methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A mounted remote.
///
/// Read operations address content by validated `VfsPath`. Write operations
/// are part of the interface so read-only backends can refuse them with
/// `ErrorKind::ReadOnlyFilesystem`.
pub trait VfsBackend: Send + Sync {
    /// Describe the backend's capabilities.
    fn info(&self) -> BackendInfo;

    /// List entries in a directory. `NotFound` if it is not a directory.
    fn list<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<Vec<VfsEntry>>>;

    /// Get metadata for a file or directory.
    fn metadata<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<VfsMetadata>>;

    /// Check whether a path exists.
    fn exists<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<bool>>;

    /// Read a file, or the given byte range of it.
    fn read<'a>(
        &'a self,
        path: &'a VfsPath,
        range: Option<ByteRange>,
    ) -> BoxFuture<'a, io::Result<Vec<u8>>>;

    /// The digest of `kind` for a file. `Ok(None)` if the kind is unsupported.
    fn hash<'a>(&'a self, path: &'a VfsPath, kind: &'a str)
    -> BoxFuture<'a, io::Result<Option<String>>>;

    /// Run a named backend command with `key=value` options.
    fn command<'a>(
        &'a self,
        name: &'a str,
        options: &'a [(String, String)],
    ) -> BoxFuture<'a, io::Result<Value>>;

    /// Create a directory.
    fn mkdir<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<()>>;

    /// Remove an empty directory.
    fn rmdir<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<()>>;

    /// Write (create or overwrite) a file with the given contents.
    fn write<'a>(&'a self, path: &'a VfsPath, data: &'a [u8]) -> BoxFuture<'a, io::Result<()>>;

    /// Delete a file.
    fn delete<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<()>>;

    /// Set a file's modification time.
    fn set_modified<'a>(
        &'a self,
        path: &'a VfsPath,
        modified: DateTime<Utc>,
    ) -> BoxFuture<'a, io::Result<()>>;
}

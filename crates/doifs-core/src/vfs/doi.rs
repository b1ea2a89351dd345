//! `VfsBackend` adapter over a [`DoiSession`].
//!
//! A thin translation layer: paths go to the session as root-relative
//! strings, `DoiError` comes back as `io::Error`. Every write operation
//! fails with [`DoiError::ReadOnly`].

use std::io;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::backend::{BoxFuture, VfsBackend};
use super::path::VfsPath;
use super::types::{BackendInfo, VfsEntry, VfsEntryKind, VfsMetadata};
use crate::entry::{DirItem, FileEntry};
use crate::error::DoiError;
use crate::http::ByteRange;
use crate::session::{COMMANDS, DoiSession};

/// A DOI remote mounted into the VFS.
pub struct DoiBackend {
    session: DoiSession,
}

impl DoiBackend {
    pub fn new(session: DoiSession) -> Self {
        Self { session }
    }

    async fn file(&self, path: &VfsPath) -> io::Result<FileEntry> {
        Ok(self.session.stat(path.as_str()).await?)
    }
}

fn read_only<'a, T: Send + 'a>() -> BoxFuture<'a, io::Result<T>> {
    Box::pin(async { Err(DoiError::ReadOnly.into()) })
}

fn file_metadata(entry: &FileEntry) -> VfsMetadata {
    VfsMetadata {
        size: entry.size,
        modified: entry.has_modified_time().then_some(entry.modified),
        kind: VfsEntryKind::File,
        content_type: (!entry.content_type.is_empty()).then(|| entry.content_type.clone()),
    }
}

fn dir_metadata() -> VfsMetadata {
    VfsMetadata {
        size: 0,
        modified: None,
        kind: VfsEntryKind::Directory,
        content_type: None,
    }
}

fn to_entry(item: &DirItem) -> VfsEntry {
    let (kind, size) = match item {
        DirItem::File(entry) => (VfsEntryKind::File, entry.size),
        DirItem::Directory { .. } => (VfsEntryKind::Directory, 0),
    };
    VfsEntry {
        name: item.name().to_string(),
        kind,
        size,
    }
}

impl VfsBackend for DoiBackend {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            description: self.session.to_string(),
            precision: self.session.precision(),
            hashes: self.session.hashes().iter().map(|h| h.to_string()).collect(),
            read_only: true,
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn list<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<Vec<VfsEntry>>> {
        Box::pin(async move {
            let items = self.session.list(path.as_str()).await?;
            Ok(items.iter().map(to_entry).collect())
        })
    }

    fn metadata<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<VfsMetadata>> {
        Box::pin(async move {
            if path.is_root() {
                return Ok(dir_metadata());
            }
            match self.session.stat(path.as_str()).await {
                Ok(entry) => Ok(file_metadata(&entry)),
                Err(DoiError::NotFound(_)) => {
                    self.session.list(path.as_str()).await?;
                    Ok(dir_metadata())
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    fn exists<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<bool>> {
        Box::pin(async move {
            match self.metadata(path).await {
                Ok(_) => Ok(true),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e),
            }
        })
    }

    fn read<'a>(
        &'a self,
        path: &'a VfsPath,
        range: Option<ByteRange>,
    ) -> BoxFuture<'a, io::Result<Vec<u8>>> {
        Box::pin(async move {
            let entry = self.file(path).await?;
            Ok(self.session.read(&entry, range).await?)
        })
    }

    fn hash<'a>(
        &'a self,
        path: &'a VfsPath,
        kind: &'a str,
    ) -> BoxFuture<'a, io::Result<Option<String>>> {
        Box::pin(async move {
            let entry = self.file(path).await?;
            Ok(entry.hash(kind).map(str::to_string))
        })
    }

    fn command<'a>(
        &'a self,
        name: &'a str,
        options: &'a [(String, String)],
    ) -> BoxFuture<'a, io::Result<Value>> {
        Box::pin(async move { Ok(self.session.command(name, options).await?) })
    }

    fn mkdir<'a>(&'a self, _path: &'a VfsPath) -> BoxFuture<'a, io::Result<()>> {
        read_only()
    }

    fn rmdir<'a>(&'a self, _path: &'a VfsPath) -> BoxFuture<'a, io::Result<()>> {
        read_only()
    }

    fn write<'a>(&'a self, _path: &'a VfsPath, _data: &'a [u8]) -> BoxFuture<'a, io::Result<()>> {
        read_only()
    }

    fn delete<'a>(&'a self, _path: &'a VfsPath) -> BoxFuture<'a, io::Result<()>> {
        read_only()
    }

    fn set_modified<'a>(
        &'a self,
        _path: &'a VfsPath,
        _modified: DateTime<Utc>,
    ) -> BoxFuture<'a, io::Result<()>> {
        read_only()
    }
}

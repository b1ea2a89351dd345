//! Vfs: the named-remote router.
//!
//! The single entry point for host operations. Each call names its remote
//! through a [`RemoteRef`] and is forwarded to the backend mounted under
//! that name. Unknown names are `NotFound`.

use std::collections::BTreeMap;
use std::io;

use chrono::{DateTime, Utc};
use log::info;
use serde_json::Value;

use super::backend::VfsBackend;
use super::path::RemoteRef;
use super::types::{BackendInfo, VfsEntry, VfsMetadata};
use crate::http::ByteRange;

/// Registry of mounted remotes.
#[derive(Default)]
pub struct Vfs {
    mounts: BTreeMap<String, Box<dyn VfsBackend>>,
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `backend` under `name`, replacing any previous mount.
    pub fn mount(&mut self, name: &str, backend: Box<dyn VfsBackend>) {
        info!("mounted '{}': {}", name, backend.info().description);
        self.mounts.insert(name.to_string(), backend);
    }

    fn backend(&self, name: &str) -> io::Result<&dyn VfsBackend> {
        self.mounts.get(name).map(Box::as_ref).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no remote named '{}'", name),
            )
        })
    }

    // -- read operations --

    pub fn info(&self, name: &str) -> io::Result<BackendInfo> {
        Ok(self.backend(name)?.info())
    }

    pub async fn list(&self, target: &RemoteRef) -> io::Result<Vec<VfsEntry>> {
        self.backend(&target.name)?.list(&target.path).await
    }

    pub async fn metadata(&self, target: &RemoteRef) -> io::Result<VfsMetadata> {
        self.backend(&target.name)?.metadata(&target.path).await
    }

    pub async fn exists(&self, target: &RemoteRef) -> io::Result<bool> {
        self.backend(&target.name)?.exists(&target.path).await
    }

    pub async fn read(&self, target: &RemoteRef, range: Option<ByteRange>) -> io::Result<Vec<u8>> {
        self.backend(&target.name)?.read(&target.path, range).await
    }

    pub async fn hash(&self, target: &RemoteRef, kind: &str) -> io::Result<Option<String>> {
        self.backend(&target.name)?.hash(&target.path, kind).await
    }

    pub async fn command(
        &self,
        name: &str,
        command: &str,
        options: &[(String, String)],
    ) -> io::Result<Value> {
        self.backend(name)?.command(command, options).await
    }

    // -- write operations --

    pub async fn mkdir(&self, target: &RemoteRef) -> io::Result<()> {
        self.backend(&target.name)?.mkdir(&target.path).await
    }

    pub async fn rmdir(&self, target: &RemoteRef) -> io::Result<()> {
        self.backend(&target.name)?.rmdir(&target.path).await
    }

    pub async fn write(&self, target: &RemoteRef, data: &[u8]) -> io::Result<()> {
        self.backend(&target.name)?.write(&target.path, data).await
    }

    pub async fn delete(&self, target: &RemoteRef) -> io::Result<()> {
        self.backend(&target.name)?.delete(&target.path).await
    }

    pub async fn set_modified(&self, target: &RemoteRef, modified: DateTime<Utc>) -> io::Result<()> {
        self.backend(&target.name)?
            .set_modified(&target.path, modified)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::backend::BoxFuture;
    use crate::vfs::path::VfsPath;
    use crate::vfs::types::VfsEntryKind;
    use std::time::Duration;

    /// One-file backend that accepts nothing but reads.
    struct FixedBackend;

    impl VfsBackend for FixedBackend {
        fn info(&self) -> BackendInfo {
            BackendInfo {
                description: "fixed".into(),
                precision: Duration::from_secs(1),
                hashes: vec![],
                read_only: true,
                commands: vec![],
            }
        }
        fn list<'a>(&'a self, _path: &'a VfsPath) -> BoxFuture<'a, io::Result<Vec<VfsEntry>>> {
            Box::pin(async {
                Ok(vec![VfsEntry {
                    name: "only.txt".into(),
                    kind: VfsEntryKind::File,
                    size: 2,
                }])
            })
        }
        fn metadata<'a>(&'a self, _path: &'a VfsPath) -> BoxFuture<'a, io::Result<VfsMetadata>> {
            Box::pin(async {
                Ok(VfsMetadata {
                    size: 2,
                    modified: None,
                    kind: VfsEntryKind::File,
                    content_type: None,
                })
            })
        }
        fn exists<'a>(&'a self, path: &'a VfsPath) -> BoxFuture<'a, io::Result<bool>> {
            Box::pin(async move { Ok(path.as_str() == "only.txt") })
        }
        fn read<'a>(
            &'a self,
            _path: &'a VfsPath,
            _range: Option<ByteRange>,
        ) -> BoxFuture<'a, io::Result<Vec<u8>>> {
            Box::pin(async { Ok(b"hi".to_vec()) })
        }
        fn hash<'a>(
            &'a self,
            _path: &'a VfsPath,
            _kind: &'a str,
        ) -> BoxFuture<'a, io::Result<Option<String>>> {
            Box::pin(async { Ok(None) })
        }
        fn command<'a>(
            &'a self,
            name: &'a str,
            _options: &'a [(String, String)],
        ) -> BoxFuture<'a, io::Result<Value>> {
            Box::pin(async move { Ok(Value::String(name.to_string())) })
        }
        fn mkdir<'a>(&'a self, _path: &'a VfsPath) -> BoxFuture<'a, io::Result<()>> {
            Box::pin(async { Err(io::ErrorKind::ReadOnlyFilesystem.into()) })
        }
        fn rmdir<'a>(&'a self, _path: &'a VfsPath) -> BoxFuture<'a, io::Result<()>> {
            Box::pin(async { Err(io::ErrorKind::ReadOnlyFilesystem.into()) })
        }
        fn write<'a>(&'a self, _path: &'a VfsPath, _data: &'a [u8]) -> BoxFuture<'a, io::Result<()>> {
            Box::pin(async { Err(io::ErrorKind::ReadOnlyFilesystem.into()) })
        }
        fn delete<'a>(&'a self, _path: &'a VfsPath) -> BoxFuture<'a, io::Result<()>> {
            Box::pin(async { Err(io::ErrorKind::ReadOnlyFilesystem.into()) })
        }
        fn set_modified<'a>(
            &'a self,
            _path: &'a VfsPath,
            _modified: DateTime<Utc>,
        ) -> BoxFuture<'a, io::Result<()>> {
            Box::pin(async { Err(io::ErrorKind::ReadOnlyFilesystem.into()) })
        }
    }

    fn setup() -> Vfs {
        let mut vfs = Vfs::new();
        vfs.mount("fixed", Box::new(FixedBackend));
        vfs
    }

    #[tokio::test]
    async fn test_routes_by_name() {
        let vfs = setup();
        let target = RemoteRef::parse("fixed:only.txt").unwrap();
        assert_eq!(vfs.read(&target, None).await.unwrap(), b"hi");
        assert!(vfs.exists(&target).await.unwrap());
        let listing = vfs.list(&RemoteRef::parse("fixed:").unwrap()).await.unwrap();
        assert_eq!(listing.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_remote_is_not_found() {
        let vfs = setup();
        let target = RemoteRef::parse("other:only.txt").unwrap();
        let err = vfs.read(&target, None).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(vfs.info("other").is_err());
    }

    #[tokio::test]
    async fn test_command_forwarded() {
        let vfs = setup();
        let out = vfs.command("fixed", "ping", &[]).await.unwrap();
        assert_eq!(out, Value::String("ping".into()));
    }

    #[tokio::test]
    async fn test_write_ops_forwarded() {
        let vfs = setup();
        let target = RemoteRef::parse("fixed:new.txt").unwrap();
        assert_eq!(
            vfs.write(&target, b"x").await.unwrap_err().kind(),
            io::ErrorKind::ReadOnlyFilesystem
        );
        assert_eq!(
            vfs.mkdir(&target).await.unwrap_err().kind(),
            io::ErrorKind::ReadOnlyFilesystem
        );
    }
}

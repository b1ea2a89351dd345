//! Host-facing filesystem surface: DOI remotes served as read-only backends.
//!
//! # Architecture
//!
//! ```text
//! cli  ->  Vfs (name:path routing)  ->  VfsBackend  ->  DoiBackend  ->  DoiSession
//! ```
//!
//! `Vfs` holds named mounts and forwards each call to the backend the name
//! selects. Backends speak `io::Result` so the host never needs to know
//! about [`DoiError`](crate::error::DoiError); the original error stays
//! reachable through `io::Error::get_ref()`.

pub mod backend;
pub mod doi;
pub mod path;
pub mod types;
mod vfs;

pub use backend::{BoxFuture, VfsBackend};
pub use doi::DoiBackend;
pub use path::{RemoteRef, VfsPath};
pub use types::{BackendInfo, VfsEntry, VfsEntryKind, VfsMetadata};
pub use vfs::Vfs;

//! doifs-core: DOI-addressed datasets as a read-only virtual filesystem.
//!
//! Resolves a DOI through the handle API, detects the hosting provider
//! (Zenodo, Dataverse, or any InvenioRDM installation found by discovery),
//! binds its record API endpoint, and serves the dataset's files as a tree.
//!
//! # Quick Start
//!
//! ```no_run
//! use doifs_core::config::{ClientConfig, Options};
//! use doifs_core::session::DoiSession;
//!
//! #[tokio::main]
//! async fn main() -> doifs_core::Result<()> {
//!     let options = Options::new("10.5281/zenodo.15063252");
//!     let (session, _is_file) =
//!         DoiSession::connect("zenodo", "", options, &ClientConfig::default()).await?;
//!     for item in session.list("").await? {
//!         println!("{}", item.path());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For host integration, wrap the session in a [`vfs::DoiBackend`] and
//! mount it into a [`vfs::Vfs`].

pub mod api;
pub mod cache;
pub mod config;
pub mod dataverse;
pub mod doi;
pub mod entry;
pub mod error;
pub mod http;
pub mod invenio;
pub mod json_ext;
pub mod link_header;
pub mod provider;
pub mod session;
pub mod vfs;
pub mod zenodo;

// Re-export commonly used types
pub use config::{ClientConfig, Options};
pub use entry::{DirItem, FileEntry};
pub use error::{DoiError, Result};
pub use provider::Provider;
pub use session::DoiSession;

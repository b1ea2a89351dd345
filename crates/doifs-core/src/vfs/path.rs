//! VFS path newtype and `name:path` remote references.
//!
//! `VfsPath` is relative to a backend's root and validated on construction:
//! it rejects `.` and `..` components, empty components and null bytes.
//! The root is the empty path. Leading and trailing slashes are dropped.

use std::fmt;
use std::io::{self, ErrorKind};

/// Path within one mounted backend.
///
/// Invariants (enforced at construction):
/// - No leading or trailing `/`
/// - No `.` or `..` components
/// - No empty components (`//`)
/// - No null bytes
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VfsPath(String);

impl VfsPath {
    /// The backend root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Validate and normalise `path`. Surrounding slashes are dropped.
    pub fn new(path: &str) -> io::Result<Self> {
        if path.contains('\0') {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "remote path contains a null byte",
            ));
        }
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        for component in trimmed.split('/') {
            if component.is_empty() {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("empty component in remote path '{}'", path),
                ));
            }
            if component == "." || component == ".." {
                return Err(io::Error::new(
                    ErrorKind::InvalidInput,
                    format!("'.' and '..' are not allowed in remote path '{}'", path),
                ));
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The path as a string slice. Empty for the root.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `name:path` reference to content in a mounted remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteRef {
    pub name: String,
    pub path: VfsPath,
}

impl RemoteRef {
    /// Parse `name:path`. A bare `name:` addresses the root.
    pub fn parse(s: &str) -> io::Result<Self> {
        let Some((name, path)) = s.split_once(':') else {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("expected 'remote:path', got '{}'", s),
            ));
        };
        if name.is_empty() || name.contains('/') {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid remote name '{}'", name),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            path: VfsPath::new(path)?,
        })
    }
}

impl fmt::Display for RemoteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.path)
    }
}

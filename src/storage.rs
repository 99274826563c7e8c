//! Storage collaborator seam: captures hand rendered bytes to an injected
//! [`ArtifactStorage`] implementation rather than talking to any storage
//! backend themselves.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Visibility of a persisted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Private,
    Public,
}

/// A persistent store for rendered artifacts. Implementations decide what a
/// key means (object name, relative path, ...).
pub trait ArtifactStorage {
    fn put(&self, key: &str, bytes: &[u8], visibility: Visibility) -> io::Result<()>;
}

/// Stores artifacts as files under a root directory, treating keys as
/// root-relative paths. Parent directories are created as needed; keys that
/// escape the root are rejected.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> io::Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if key.is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("storage key must be a relative path, got {:?}", key),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl ArtifactStorage for DiskStorage {
    fn put(&self, key: &str, bytes: &[u8], visibility: Visibility) -> io::Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = match visibility {
                Visibility::Private => 0o600,
                Visibility::Public => 0o644,
            };
            fs::set_permissions(&path, fs::Permissions::from_mode(mode))?;
        }
        #[cfg(not(unix))]
        let _ = visibility;

        Ok(())
    }
}

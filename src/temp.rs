//! Temporary-artifact lifecycle: allocation of uniquely named output paths,
//! tracking, and guaranteed best-effort deletion.
//!
//! Every allocated path is tracked twice: by the owning [`TempFileManager`]
//! (released on drop) and by a process-global registry swept by
//! [`sweep_all`] / [`ShutdownSweeper`] so artifacts leaked past structured
//! teardown are still removed at normal process exit.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use log::warn;
use uuid::Uuid;

use crate::error::{PagecapError, Result};

const FILE_PREFIX: &str = "pagecap";

fn registry() -> &'static Mutex<BTreeSet<PathBuf>> {
    static REGISTRY: OnceLock<Mutex<BTreeSet<PathBuf>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(BTreeSet::new()))
}

fn register(path: &Path) {
    if let Ok(mut set) = registry().lock() {
        set.insert(path.to_path_buf());
    }
}

fn deregister(path: &Path) {
    if let Ok(mut set) = registry().lock() {
        set.remove(path);
    }
}

/// Deletes the file if it still exists. Failures are swallowed: cleanup must
/// never mask the primary operation's result.
fn delete_if_exists(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(err) => {
            warn!("failed to delete temp file {}: {}", path.display(), err);
            false
        }
    }
}

/// Deletes every temp path still registered process-wide and returns how many
/// files were actually removed. Safe to call repeatedly; an empty registry is
/// a no-op.
pub fn sweep_all() -> usize {
    let paths: Vec<PathBuf> = match registry().lock() {
        Ok(mut set) => std::mem::take(&mut *set).into_iter().collect(),
        Err(_) => return 0,
    };
    paths.iter().filter(|p| delete_if_exists(p)).count()
}

/// RAII backstop for normal process termination: hold one near the top of
/// `main` and every temp file still registered is swept when it drops, even
/// if some adapter was leaked instead of dropped.
#[derive(Debug, Default)]
pub struct ShutdownSweeper {
    _private: (),
}

impl ShutdownSweeper {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Drop for ShutdownSweeper {
    fn drop(&mut self) {
        let removed = sweep_all();
        if removed > 0 {
            warn!("swept {} orphaned temp file(s) at shutdown", removed);
        }
    }
}

/// Owns the temp files produced by one capture session.
///
/// Paths are allocated without creating the file; the render step writes into
/// them. Dropping the manager releases everything it tracked.
#[derive(Debug, Default)]
pub struct TempFileManager {
    directory: Option<PathBuf>,
    tracked: Vec<PathBuf>,
}

impl TempFileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the platform temp directory for subsequent allocations.
    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = Some(directory.into());
    }

    /// The directory new allocations land in: the explicit override if set,
    /// otherwise the platform temp directory.
    pub fn directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Reserves a collision-resistant output path with the given extension.
    ///
    /// Ensures the target directory exists and is writable, records the path
    /// for cleanup, and returns it. The file itself is not created.
    pub fn allocate(&mut self, extension: &str) -> Result<PathBuf> {
        let dir = self.directory();

        fs::create_dir_all(&dir).map_err(|err| PagecapError::DirectoryUnavailable {
            path: dir.clone(),
            reason: format!("cannot create: {}", err),
        })?;

        let meta = fs::metadata(&dir).map_err(|err| PagecapError::DirectoryUnavailable {
            path: dir.clone(),
            reason: format!("cannot stat: {}", err),
        })?;
        if meta.permissions().readonly() {
            return Err(PagecapError::DirectoryUnavailable {
                path: dir,
                reason: "not writable".to_string(),
            });
        }

        let name = format!("{}-{}.{}", FILE_PREFIX, Uuid::new_v4().simple(), extension);
        let path = dir.join(name);

        register(&path);
        self.tracked.push(path.clone());
        Ok(path)
    }

    /// Releases a single tracked path: deletes the file if it exists and
    /// stops tracking it. Unknown paths are ignored.
    pub fn release(&mut self, path: &Path) {
        self.tracked.retain(|p| p != path);
        delete_if_exists(path);
        deregister(path);
    }

    /// Releases every tracked path. Deletion failures are swallowed; calling
    /// this repeatedly, or with nothing tracked, is safe.
    pub fn release_all(&mut self) {
        for path in self.tracked.drain(..) {
            delete_if_exists(&path);
            deregister(&path);
        }
    }

    #[cfg(test)]
    fn tracked_count(&self) -> usize {
        self.tracked.len()
    }
}

impl Drop for TempFileManager {
    fn drop(&mut self) {
        self.release_all();
    }
}

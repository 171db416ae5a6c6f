//! Project filesystem collaborator
//!
//! Reconciliation and state sync only ever need three operations on the
//! project directory. They are behind [`ProjectFs`] so the engine can run
//! against the real disk ([`LocalFs`]) or an in-memory tree ([`MemoryFs`]).

use crate::atomic_write::write_file_atomic;
use crate::error::FsError;
use async_trait::async_trait;
use camino::Utf8PathBuf;
use std::path::Path;

/// Minimal async filesystem used by the workflow engine.
#[async_trait]
pub trait ProjectFs: Send + Sync {
    /// Whether `path` exists. Probe failures report `false`.
    async fn exists(&self, path: &Path) -> bool;

    /// Read a UTF-8 file. Missing or unreadable files are errors.
    async fn read(&self, path: &Path) -> Result<String, FsError>;

    /// Replace the file at `path` with `contents`, creating parents.
    async fn write(&self, path: &Path, contents: &str) -> Result<(), FsError>;
}

/// The local disk. Writes are atomic (temp file + rename).
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProjectFs for LocalFs {
    async fn exists(&self, path: &Path) -> bool {
        match tokio::fs::try_exists(path).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Existence probe failed");
                false
            }
        }
    }

    async fn read(&self, path: &Path) -> Result<String, FsError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FsError::from_io(path.display().to_string(), e))
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<(), FsError> {
        let target = Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(|p| {
            FsError::NonUtf8Path {
                path: p.display().to_string(),
            }
        })?;
        let contents = contents.to_string();
        let display = target.to_string();

        let joined =
            tokio::task::spawn_blocking(move || write_file_atomic(&target, &contents)).await;
        match joined {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(FsError::Io {
                path: display,
                source: std::io::Error::other(format!("{e:#}")),
            }),
            Err(join_err) => Err(FsError::Io {
                path: display,
                source: std::io::Error::other(join_err.to_string()),
            }),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryFs;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Tree {
        files: BTreeMap<PathBuf, String>,
        read_only: BTreeSet<PathBuf>,
    }

    /// In-memory project tree for tests and demo mode.
    ///
    /// A path "exists" if it is a file or a prefix of one.
    #[derive(Debug, Default)]
    pub struct MemoryFs {
        tree: Mutex<Tree>,
    }

    impl MemoryFs {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Builder-style file insertion.
        #[must_use]
        pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
            self.insert(path, contents);
            self
        }

        pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
            self.lock().files.insert(path.into(), contents.into());
        }

        /// Current contents of a file.
        #[must_use]
        pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
            self.lock().files.get(path.as_ref()).cloned()
        }

        /// Make writes to `path` fail.
        pub fn set_read_only(&self, path: impl Into<PathBuf>) {
            self.lock().read_only.insert(path.into());
        }

        #[must_use]
        pub fn paths(&self) -> Vec<PathBuf> {
            self.lock().files.keys().cloned().collect()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Tree> {
            // A poisoned lock only means another test thread panicked mid-insert.
            self.tree.lock().unwrap_or_else(|p| p.into_inner())
        }
    }

    #[async_trait]
    impl ProjectFs for MemoryFs {
        async fn exists(&self, path: &Path) -> bool {
            let tree = self.lock();
            tree.files.contains_key(path) || tree.files.keys().any(|f| f.starts_with(path))
        }

        async fn read(&self, path: &Path) -> Result<String, FsError> {
            self.lock()
                .files
                .get(path)
                .cloned()
                .ok_or_else(|| FsError::NotFound {
                    path: path.display().to_string(),
                })
        }

        async fn write(&self, path: &Path, contents: &str) -> Result<(), FsError> {
            let mut tree = self.lock();
            if tree.read_only.contains(path) {
                return Err(FsError::ReadOnly {
                    path: path.display().to_string(),
                });
            }
            tree.files.insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_fs_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".genius").join("STATE.json");
        let fs = LocalFs::new();

        assert!(!fs.exists(&path).await);
        assert!(matches!(
            fs.read(&path).await,
            Err(FsError::NotFound { .. })
        ));

        fs.write(&path, "{}").await.unwrap();
        assert!(fs.exists(&path).await);
        assert_eq!(fs.read(&path).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_memory_fs_read_write() {
        let fs = MemoryFs::new().with_file("/p/DISCOVERY.xml", "<discovery/>");
        assert!(fs.exists(Path::new("/p/DISCOVERY.xml")).await);
        assert!(fs.exists(Path::new("/p")).await);
        assert!(!fs.exists(Path::new("/p/ARCHITECTURE.md")).await);

        fs.write(Path::new("/p/a.txt"), "hi").await.unwrap();
        assert_eq!(fs.get("/p/a.txt").as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_memory_fs_read_only_write_fails() {
        let fs = MemoryFs::new();
        fs.set_read_only("/p/STATE.json");
        let err = fs
            .write(Path::new("/p/STATE.json"), "{}")
            .await
            .unwrap_err();
        assert!(matches!(err, FsError::ReadOnly { .. }));
        assert!(fs.get("/p/STATE.json").is_none());
    }
}

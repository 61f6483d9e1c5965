//! Filesystem access used for asset existence probes and digests.

use std::path::Path;

/// Synchronous filesystem access for referenced assets.
pub trait AssetFs: Send + Sync {
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Read the raw bytes of `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// [`AssetFs`] backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFs;

impl AssetFs for NativeFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MemoryFs;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::RwLock;

    use super::AssetFs;

    /// In-memory [`AssetFs`] for tests.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use assetline_rewrite::{AssetFs, MemoryFs};
    ///
    /// let fs = MemoryFs::new().with_file("/app/img/logo.png", b"png");
    /// assert!(fs.exists(Path::new("/app/img/logo.png")));
    /// ```
    #[derive(Debug, Default)]
    pub struct MemoryFs {
        files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    }

    impl MemoryFs {
        /// Create an empty filesystem.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a file with the given contents.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned.
        #[must_use]
        pub fn with_file(self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) -> Self {
            self.files
                .write()
                .unwrap()
                .insert(path.into(), contents.as_ref().to_vec());
            self
        }
    }

    impl AssetFs for MemoryFs {
        fn exists(&self, path: &Path) -> bool {
            self.files.read().unwrap().contains_key(path)
        }

        fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
            self.files
                .read()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("file not found: {}", path.display()),
                    )
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_native_fs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("logo.png");
        std::fs::write(&file, b"png").unwrap();

        assert!(NativeFs.exists(&file));
        assert_eq!(NativeFs.read(&file).unwrap(), b"png");
        assert!(!NativeFs.exists(&dir.path().join("missing.png")));
        assert!(NativeFs.read(&dir.path().join("missing.png")).is_err());
    }

    #[test]
    fn test_memory_fs() {
        let fs = MemoryFs::new().with_file("/app/logo.png", b"png");

        assert!(fs.exists(Path::new("/app/logo.png")));
        assert!(!fs.exists(Path::new("/app/other.png")));
        assert_eq!(fs.read(Path::new("/app/logo.png")).unwrap(), b"png");
        assert_eq!(
            fs.read(Path::new("/app/other.png")).unwrap_err().kind(),
            std::io::ErrorKind::NotFound
        );
    }
}

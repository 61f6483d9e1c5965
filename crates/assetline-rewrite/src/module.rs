//! Module descriptions and name resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A resolvable unit of the asset tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name, used as the `{name}` segment of emitted URLs.
    pub name: String,
    /// Declared version, used only by the `{version}` URL placeholder.
    pub version: Option<String>,
    /// Module root directory.
    pub path: PathBuf,
    /// Asset directory relative to `path` (empty means `path` itself).
    pub assets_root: PathBuf,
}

impl ModuleInfo {
    /// Create a module rooted at `path` with no version and no asset subdirectory.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            version: None,
            path: path.into(),
            assets_root: PathBuf::new(),
        }
    }

    /// Set the declared version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the asset subdirectory.
    #[must_use]
    pub fn with_assets_root(mut self, assets_root: impl Into<PathBuf>) -> Self {
        self.assets_root = assets_root.into();
        self
    }

    /// Absolute directory under which this module's assets live.
    #[must_use]
    pub fn asset_dir(&self) -> PathBuf {
        if self.assets_root.as_os_str().is_empty() {
            self.path.clone()
        } else {
            self.path.join(&self.assets_root)
        }
    }

    /// Directory holding this module's own dependencies.
    #[must_use]
    pub fn dependency_dir(&self) -> PathBuf {
        self.path.join(crate::DEPENDENCY_DIR)
    }
}

/// Resolves `name:` prefixes of cross-module references.
///
/// Implementations are read-only from the rewriter's point of view and may be
/// shared between files processed concurrently.
pub trait ModuleResolver: Send + Sync {
    /// Look up a module by name. `None` means the module does not exist.
    fn resolve(&self, name: &str) -> Option<ModuleInfo>;
}

/// In-memory [`ModuleResolver`] keyed by module name.
#[derive(Debug, Default, Clone)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ModuleInfo>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module, replacing any module with the same name.
    pub fn insert(&mut self, module: ModuleInfo) {
        self.modules.insert(module.name.clone(), module);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_module(mut self, module: ModuleInfo) -> Self {
        self.insert(module);
        self
    }

    /// Get a module by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules.get(name)
    }

    /// Find the module whose root directory contains `path`.
    ///
    /// When module roots are nested, the deepest root wins.
    #[must_use]
    pub fn module_for(&self, path: &Path) -> Option<&ModuleInfo> {
        self.modules
            .values()
            .filter(|module| path.starts_with(&module.path))
            .max_by_key(|module| module.path.components().count())
    }

    /// Iterate over registered modules in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.modules.values()
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleResolver for ModuleRegistry {
    fn resolve(&self, name: &str) -> Option<ModuleInfo> {
        self.get(name).cloned()
    }
}

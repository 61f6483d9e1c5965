//! Rewrite error types.

use std::path::PathBuf;

/// Errors that abort rewriting of a whole file.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// A `module:path` reference names a module the resolver does not know.
    #[error("can not find module: {module} (referenced by {})", .referrer.display())]
    ModuleNotFound {
        /// Module token as written before the colon.
        module: String,
        /// File containing the reference.
        referrer: PathBuf,
    },

    /// The URL pattern carries a `{version}` placeholder while content-hash
    /// cache busting is selected.
    #[error("url pattern `{pattern}` uses {{version}}, which conflicts with content-hash cache busting")]
    ConflictingCacheBusting {
        /// Offending pattern.
        pattern: String,
    },
}

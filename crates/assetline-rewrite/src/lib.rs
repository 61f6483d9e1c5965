//! CSS reference rewriting for assetline.
//!
//! Compiled stylesheets are concatenated and served from a URL root that has
//! nothing to do with where their sources live, so relative `url(...)` and
//! `@import "..."` arguments stop resolving. This crate rewrites them into
//! absolute, module-qualified URLs:
//!
//! - `url(../img/logo.png)` in `app/css/main.scss` → `url(/g/app/img/logo.png)`
//! - `url(widgets:icons/x.svg)` → `url(/g/widgets/icons/x.svg)` (cross-module)
//! - `url(/static/a.png)`, `url(https://...)`, `url(data:...)` → unchanged
//!
//! In production builds with [`CacheBusting::ContentHash`], existing assets get
//! a SHA-1 prefix inserted before their extension (`logo-2aae6c35c9.png`). With
//! [`CacheBusting::Version`] the URL pattern's `{version}` placeholder carries
//! the module version instead.
//!
//! # Seams
//!
//! - [`ModuleResolver`]: maps `name:` prefixes to [`ModuleInfo`]
//!   ([`ModuleRegistry`] is the in-memory implementation)
//! - [`AssetFs`]: existence probes and reads ([`NativeFs`]; `MemoryFs` with the
//!   `mock` feature)
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use assetline_rewrite::{
//!     ModuleInfo, ModuleRegistry, NativeFs, RewriteContext, RewriteOptions, rewrite_css,
//! };
//!
//! let module = ModuleInfo::new("app", "/srv/app");
//! let registry = ModuleRegistry::new().with_module(module.clone());
//! let options = RewriteOptions::default();
//! let ctx = RewriteContext {
//!     module: &module,
//!     source_path: Path::new("/srv/app/css/main.scss"),
//!     resolver: &registry,
//!     fs: &NativeFs,
//!     options: &options,
//! };
//!
//! let out = rewrite_css(".a{background:url(data:image/png;base64,AA)}", &ctx).unwrap();
//! assert_eq!(out.css, ".a{background:url(data:image/png;base64,AA)}");
//! ```

mod digest;
mod error;
mod fs;
mod module;
mod path;
mod pattern;
mod reference;
mod rewriter;

/// Directory name holding a module's or application's dependencies.
pub const DEPENDENCY_DIR: &str = "node_modules";

pub use digest::{DIGEST_LEN, content_digest, digest_path};
pub use error::RewriteError;
#[cfg(any(test, feature = "mock"))]
pub use fs::MemoryFs;
pub use fs::{AssetFs, NativeFs};
pub use module::{ModuleInfo, ModuleRegistry, ModuleResolver};
pub use pattern::{DEFAULT_PREFIX, Placeholder, UrlPattern};
pub use reference::{Reference, ReferenceKind, Target, classify, scan_references};
pub use rewriter::{
    CacheBusting, MissingAsset, Mode, RewriteContext, RewriteOptions, Rewritten, rewrite_css,
};

//! CSS reference rewriting.
//!
//! Every `url(...)` and `@import "..."` argument is turned into an absolute,
//! module-qualified URL so the stylesheet keeps working after it is
//! concatenated with others or served from another root.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::digest::{content_digest, digest_path};
use crate::error::RewriteError;
use crate::fs::AssetFs;
use crate::module::{ModuleInfo, ModuleResolver};
use crate::path::{join_normalized, relative_dir};
use crate::pattern::{Placeholder, UrlPattern};
use crate::reference::{Target, classify, scan_references};

/// Build mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Local development: no content digests.
    Development,
    /// Release build.
    #[default]
    Production,
}

/// Cache invalidation strategy for emitted URLs.
///
/// The strategies are exclusive: a content digest is never combined with a
/// `{version}` placeholder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CacheBusting {
    /// Insert a SHA-1 prefix of the asset bytes before the file extension
    /// (production mode only).
    #[default]
    ContentHash,
    /// Leave paths untouched; the URL pattern's `{version}` placeholder
    /// carries the module version.
    Version,
}

/// Per-build rewrite settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    mode: Mode,
    url_pattern: UrlPattern,
    cache_busting: CacheBusting,
}

impl RewriteOptions {
    /// Create rewrite options.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::ConflictingCacheBusting`] when `url_pattern`
    /// uses `{version}` together with [`CacheBusting::ContentHash`].
    pub fn new(
        mode: Mode,
        url_pattern: UrlPattern,
        cache_busting: CacheBusting,
    ) -> Result<Self, RewriteError> {
        if cache_busting == CacheBusting::ContentHash
            && url_pattern.has_placeholder(Placeholder::Version)
        {
            return Err(RewriteError::ConflictingCacheBusting {
                pattern: url_pattern.as_str().to_owned(),
            });
        }
        Ok(Self {
            mode,
            url_pattern,
            cache_busting,
        })
    }

    /// Build mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// URL pattern used for emitted references.
    #[must_use]
    pub fn url_pattern(&self) -> &UrlPattern {
        &self.url_pattern
    }

    /// Cache busting strategy.
    #[must_use]
    pub fn cache_busting(&self) -> CacheBusting {
        self.cache_busting
    }

    fn hashes_content(&self) -> bool {
        self.mode == Mode::Production && self.cache_busting == CacheBusting::ContentHash
    }
}

/// Everything needed to rewrite one file's references.
#[derive(Clone, Copy)]
pub struct RewriteContext<'a> {
    /// Module that owns the file being rewritten.
    pub module: &'a ModuleInfo,
    /// Absolute path of the file being rewritten.
    pub source_path: &'a Path,
    /// Resolver for `module:path` references.
    pub resolver: &'a dyn ModuleResolver,
    /// Filesystem used for existence probes and digests.
    pub fs: &'a dyn AssetFs,
    /// Build settings.
    pub options: &'a RewriteOptions,
}

/// A reference whose target file does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAsset {
    /// Reference as written in the CSS.
    pub reference: String,
    /// Filesystem path that was probed.
    pub path: PathBuf,
}

/// Result of [`rewrite_css`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// CSS with rewritten references.
    pub css: String,
    /// References that point at files that do not exist.
    pub missing: Vec<MissingAsset>,
}

/// Rewrite every `url(...)` and `@import "..."` reference in `css`.
///
/// Only the argument text of each reference is replaced; parentheses, quotes
/// and whitespace around it are kept as written. Absolute URLs and `data:`
/// URIs are left alone.
///
/// Missing target files are logged and reported in [`Rewritten::missing`]
/// but do not stop the rewrite.
///
/// # Errors
///
/// Returns [`RewriteError::ModuleNotFound`] if a `module:path` reference names
/// an unknown module. No partial output is produced in that case.
pub fn rewrite_css(css: &str, ctx: &RewriteContext<'_>) -> Result<Rewritten, RewriteError> {
    let mut rewriter = Rewriter::new(ctx);
    let mut out = String::with_capacity(css.len());
    let mut last = 0;

    for reference in scan_references(css) {
        out.push_str(&css[last..reference.span.start]);
        out.push_str(&rewriter.rewrite_url(reference.raw)?);
        last = reference.span.end;
    }
    out.push_str(&css[last..]);

    Ok(Rewritten {
        css: out,
        missing: rewriter.missing,
    })
}

/// Per-file rewrite state.
struct Rewriter<'c, 'a> {
    ctx: &'c RewriteContext<'a>,
    /// Directory of the source file relative to its module's asset root.
    source_dir: String,
    missing: Vec<MissingAsset>,
}

impl<'c, 'a> Rewriter<'c, 'a> {
    fn new(ctx: &'c RewriteContext<'a>) -> Self {
        Self {
            ctx,
            source_dir: relative_dir(&ctx.module.asset_dir(), ctx.source_path),
            missing: Vec::new(),
        }
    }

    fn rewrite_url<'r>(&mut self, raw: &'r str) -> Result<Cow<'r, str>, RewriteError> {
        let (owner, candidate) = match classify(raw) {
            Target::External => return Ok(Cow::Borrowed(raw)),
            Target::Module { module, path } => {
                let owner = self.ctx.resolver.resolve(module).ok_or_else(|| {
                    RewriteError::ModuleNotFound {
                        module: module.to_owned(),
                        referrer: self.ctx.source_path.to_path_buf(),
                    }
                })?;
                tracing::debug!(module, path, "resolved cross-module reference");
                (Cow::Owned(owner), path.to_owned())
            }
            Target::Relative(path) => {
                let (path, suffix) = split_suffix(path);
                let joined = join_normalized(&self.source_dir, path);
                (Cow::Borrowed(self.ctx.module), format!("{joined}{suffix}"))
            }
        };

        let (asset_path, suffix) = split_suffix(&candidate);
        let file = owner.asset_dir().join(asset_path.trim_start_matches('/'));

        let asset_path = if self.ctx.fs.exists(&file) {
            self.cache_bust(asset_path, &file)
        } else {
            tracing::warn!(
                "resource not exists: {}, reference by {}",
                file.display(),
                self.ctx.source_path.display()
            );
            self.missing.push(MissingAsset {
                reference: raw.to_owned(),
                path: file,
            });
            asset_path.to_owned()
        };

        let path = format!("{asset_path}{suffix}");
        let url = self.ctx.options.url_pattern.render(
            &owner.name,
            owner.version.as_deref(),
            &path,
        );
        Ok(Cow::Owned(url))
    }

    fn cache_bust(&self, asset_path: &str, file: &Path) -> String {
        if !self.ctx.options.hashes_content() {
            return asset_path.to_owned();
        }
        match self.ctx.fs.read(file) {
            Ok(bytes) => digest_path(asset_path, &content_digest(&bytes)),
            Err(err) => {
                tracing::warn!("failed to hash {}: {err}", file.display());
                asset_path.to_owned()
            }
        }
    }
}

/// Split `path` at the first `?` or `#` into the file path and its suffix.
fn split_suffix(path: &str) -> (&str, &str) {
    path.find(['?', '#'])
        .map_or((path, ""), |pos| path.split_at(pos))
}

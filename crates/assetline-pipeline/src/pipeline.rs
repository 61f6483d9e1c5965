//! Per-file build: skip check, compile, rewrite.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetline_config::{Config, ConfigError};
use assetline_rewrite::{
    AssetFs, DEPENDENCY_DIR, ModuleInfo, ModuleResolver, NativeFs, RewriteContext, RewriteError,
    RewriteOptions, rewrite_css,
};

use crate::compiler::{CompileError, CompileOptions, StylesheetCompiler};
use crate::skip::{SkipReason, should_skip};

/// Result of processing one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file is not built on its own.
    Skipped(SkipReason),
    /// Compiled and rewritten CSS.
    Compiled(String),
}

/// Pipeline error. Either stage failing aborts the file with no output.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Settings shared by every file of a build.
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    /// Development build.
    pub development: bool,
    /// Application root directory.
    pub application_root: PathBuf,
    /// Extra include paths, searched before module and application paths.
    pub include_paths: Vec<PathBuf>,
    /// Compression override (default: compress unless development).
    pub compress: Option<bool>,
    /// Source map override (default: only in development).
    pub source_map: Option<bool>,
    /// Honor the legacy `ignore` directive.
    pub legacy_ignore: bool,
    /// URL rewriting options.
    pub rewrite: RewriteOptions,
}

impl PipelineSettings {
    /// Build settings from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the asset URL settings conflict.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            development: config.development,
            application_root: config.application_root.clone(),
            include_paths: config.compiler.paths.clone(),
            compress: config.compiler.compress,
            source_map: config.compiler.source_map,
            legacy_ignore: config.legacy_ignore,
            rewrite: config.rewrite_options()?,
        })
    }

    /// Compiler options for `path`, owned by `module`.
    pub fn compile_options(&self, path: &Path, module: &ModuleInfo) -> CompileOptions {
        let mut paths = self.include_paths.clone();
        paths.extend([
            module.path.clone(),
            module.dependency_dir(),
            self.application_root.clone(),
            self.application_root.join(DEPENDENCY_DIR),
        ]);

        CompileOptions {
            filename: path.to_path_buf(),
            paths,
            compress: self.compress.unwrap_or(!self.development),
            source_map: self.source_map.unwrap_or(self.development),
        }
    }
}

/// Stylesheet build pipeline.
///
/// Holds no per-file state, so one instance can serve concurrent builds.
pub struct Pipeline<C> {
    compiler: C,
    settings: PipelineSettings,
    resolver: Arc<dyn ModuleResolver>,
    fs: Arc<dyn AssetFs>,
}

impl<C: StylesheetCompiler> Pipeline<C> {
    /// Create a pipeline probing assets on the local filesystem.
    pub fn new(compiler: C, settings: PipelineSettings, resolver: Arc<dyn ModuleResolver>) -> Self {
        Self {
            compiler,
            settings,
            resolver,
            fs: Arc::new(NativeFs),
        }
    }

    /// Replace the filesystem used for asset probes and digests.
    #[must_use]
    pub fn with_fs(mut self, fs: Arc<dyn AssetFs>) -> Self {
        self.fs = fs;
        self
    }

    /// Pipeline settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Build one stylesheet.
    ///
    /// `path` is the source location, `source` its contents and `module` the
    /// module owning it.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Compile` if the compiler rejects the source and
    /// `PipelineError::Rewrite` if a cross-module reference cannot be resolved.
    pub async fn process(
        &self,
        path: &Path,
        source: &str,
        module: &ModuleInfo,
    ) -> Result<Outcome, PipelineError> {
        if let Some(reason) = should_skip(path, source, self.settings.legacy_ignore) {
            tracing::info!(path = %path.display(), %reason, "Skipping stylesheet");
            return Ok(Outcome::Skipped(reason));
        }

        tracing::info!(path = %path.display(), module = %module.name, "Building stylesheet");

        let options = self.settings.compile_options(path, module);
        tracing::debug!(paths = ?options.paths, compress = options.compress, "Compiler options");
        let compiled = self.compiler.compile(source.to_owned(), options).await?;

        let ctx = RewriteContext {
            module,
            source_path: path,
            resolver: self.resolver.as_ref(),
            fs: self.fs.as_ref(),
            options: &self.settings.rewrite,
        };
        let rewritten = rewrite_css(&compiled.css, &ctx)?;
        if !rewritten.missing.is_empty() {
            tracing::debug!(
                path = %path.display(),
                count = rewritten.missing.len(),
                "Stylesheet references missing assets"
            );
        }

        Ok(Outcome::Compiled(rewritten.css))
    }
}

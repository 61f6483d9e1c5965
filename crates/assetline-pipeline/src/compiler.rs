//! Stylesheet compiler seam and the grass-backed implementation.

use std::future::Future;
use std::path::{Path, PathBuf};

use grass::{InputSyntax, OutputStyle};

/// Options passed to a [`StylesheetCompiler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Logical filename of the source, used for relative imports and errors.
    pub filename: PathBuf,
    /// Include directories, searched in order.
    pub paths: Vec<PathBuf>,
    /// Emit compressed output.
    pub compress: bool,
    /// Request an inline source map.
    pub source_map: bool,
}

/// Compiler output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCss {
    /// Compiled stylesheet text.
    pub css: String,
}

/// Compilation failure.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The compiler rejected the source.
    #[error("{}: {message}", .filename.display())]
    Failed {
        /// Logical filename of the source.
        filename: PathBuf,
        /// Compiler message, unchanged.
        message: String,
    },

    /// The blocking compile task panicked or was cancelled.
    #[error("compile task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Asynchronous stylesheet compiler.
///
/// Implementations must be shareable between concurrently processed files.
pub trait StylesheetCompiler: Send + Sync {
    /// Compile `source` into CSS.
    fn compile(
        &self,
        source: String,
        options: CompileOptions,
    ) -> impl Future<Output = Result<CompiledCss, CompileError>> + Send;
}

/// [`StylesheetCompiler`] backed by the pure-Rust `grass` compiler.
///
/// grass is synchronous, so each compile runs on tokio's blocking pool.
/// It has no source map support; a source map request is logged and ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct GrassCompiler;

impl GrassCompiler {
    /// Create a new grass compiler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StylesheetCompiler for GrassCompiler {
    async fn compile(
        &self,
        source: String,
        options: CompileOptions,
    ) -> Result<CompiledCss, CompileError> {
        if options.source_map {
            tracing::debug!(
                filename = %options.filename.display(),
                "Source maps are not supported by grass, skipping"
            );
        }

        tokio::task::spawn_blocking(move || compile_blocking(&source, &options)).await?
    }
}

fn compile_blocking(source: &str, options: &CompileOptions) -> Result<CompiledCss, CompileError> {
    let style = if options.compress {
        OutputStyle::Compressed
    } else {
        OutputStyle::Expanded
    };

    // grass::from_string has no notion of a filename, so relative imports are
    // resolved through the source directory placed ahead of the include paths.
    let mut load_paths = Vec::with_capacity(options.paths.len() + 1);
    if let Some(dir) = options.filename.parent() {
        load_paths.push(dir.to_path_buf());
    }
    load_paths.extend(options.paths.iter().cloned());

    let grass_options = grass::Options::default()
        .style(style)
        .input_syntax(input_syntax(&options.filename))
        .load_paths(&load_paths);

    grass::from_string(source, &grass_options)
        .map(|css| CompiledCss { css })
        .map_err(|e| CompileError::Failed {
            filename: options.filename.clone(),
            message: e.to_string(),
        })
}

fn input_syntax(filename: &Path) -> InputSyntax {
    match filename.extension().and_then(|ext| ext.to_str()) {
        Some("sass") => InputSyntax::Sass,
        Some("css") => InputSyntax::Css,
        _ => InputSyntax::Scss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options(filename: &str, compress: bool) -> CompileOptions {
        CompileOptions {
            filename: PathBuf::from(filename),
            compress,
            ..CompileOptions::default()
        }
    }

    #[tokio::test]
    async fn test_compile_compressed() {
        let css = GrassCompiler::new()
            .compile(
                "$size: 42em;\nbody { font-size: $size; }".to_owned(),
                options("/app/main.scss", true),
            )
            .await
            .unwrap();

        assert_eq!(css.css.trim(), "body{font-size:42em}");
    }

    #[tokio::test]
    async fn test_compile_expanded() {
        let css = GrassCompiler::new()
            .compile(
                ".a { .b { color: red; } }".to_owned(),
                options("/app/main.scss", false),
            )
            .await
            .unwrap();

        assert_eq!(css.css.trim(), ".a .b {\n  color: red;\n}");
    }

    #[tokio::test]
    async fn test_compile_error_names_file() {
        let err = GrassCompiler::new()
            .compile("body { color: }".to_owned(), options("/app/broken.scss", true))
            .await
            .unwrap_err();

        assert!(matches!(err, CompileError::Failed { .. }));
        assert!(err.to_string().starts_with("/app/broken.scss: "));
    }

    #[tokio::test]
    async fn test_compile_resolves_imports_from_load_paths() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared");
        std::fs::create_dir(&shared).unwrap();
        std::fs::write(shared.join("_vars.scss"), "$gap: 3px;").unwrap();

        let css = GrassCompiler::new()
            .compile(
                "@import \"vars\";\n.brand { margin: $gap; }".to_owned(),
                CompileOptions {
                    filename: dir.path().join("css/main.scss"),
                    paths: vec![shared],
                    compress: true,
                    source_map: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(css.css.trim(), ".brand{margin:3px}");
    }

    #[tokio::test]
    async fn test_compile_resolves_imports_next_to_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("_mixins.scss"), "%pad { padding: 1px; }").unwrap();

        let css = GrassCompiler::new()
            .compile(
                "@import \"mixins\";\n.box { @extend %pad; }".to_owned(),
                options(dir.path().join("main.scss").to_str().unwrap(), true),
            )
            .await
            .unwrap();

        assert_eq!(css.css.trim(), ".box{padding:1px}");
    }

    #[test]
    fn test_input_syntax_from_extension() {
        assert!(matches!(input_syntax(Path::new("a.sass")), InputSyntax::Sass));
        assert!(matches!(input_syntax(Path::new("a.css")), InputSyntax::Css));
        assert!(matches!(input_syntax(Path::new("a.scss")), InputSyntax::Scss));
        assert!(matches!(input_syntax(Path::new("a.less")), InputSyntax::Scss));
    }
}

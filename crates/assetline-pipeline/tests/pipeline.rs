use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use assetline_pipeline::{
    CompileError, CompileOptions, CompiledCss, GrassCompiler, Outcome, Pipeline, PipelineError,
    PipelineSettings, SkipReason, StylesheetCompiler,
};
use assetline_rewrite::{
    CacheBusting, MemoryFs, Mode, ModuleInfo, ModuleRegistry, RewriteError, RewriteOptions,
    UrlPattern, content_digest,
};
use pretty_assertions::assert_eq;

/// Returns the source unchanged and records every call.
#[derive(Default)]
struct EchoCompiler {
    calls: Mutex<Vec<CompileOptions>>,
}

impl EchoCompiler {
    fn calls(&self) -> Vec<CompileOptions> {
        self.calls.lock().unwrap().clone()
    }
}

impl StylesheetCompiler for &EchoCompiler {
    async fn compile(
        &self,
        source: String,
        options: CompileOptions,
    ) -> Result<CompiledCss, CompileError> {
        self.calls.lock().unwrap().push(options);
        Ok(CompiledCss { css: source })
    }
}

/// Rejects every source.
struct FailingCompiler;

impl StylesheetCompiler for FailingCompiler {
    async fn compile(
        &self,
        _source: String,
        options: CompileOptions,
    ) -> Result<CompiledCss, CompileError> {
        Err(CompileError::Failed {
            filename: options.filename,
            message: "Expected expression.".to_owned(),
        })
    }
}

fn app() -> ModuleInfo {
    ModuleInfo::new("app", "/srv/app").with_version("1.0.0")
}

fn registry() -> Arc<ModuleRegistry> {
    Arc::new(
        ModuleRegistry::new()
            .with_module(app())
            .with_module(ModuleInfo::new("widgets", "/srv/widgets").with_version("2.3.0")),
    )
}

fn memory_fs() -> Arc<MemoryFs> {
    Arc::new(
        MemoryFs::new()
            .with_file("/srv/app/img/logo.png", "hello world")
            .with_file("/srv/widgets/base.css", "x"),
    )
}

fn settings(rewrite: RewriteOptions) -> PipelineSettings {
    PipelineSettings {
        application_root: PathBuf::from("/srv"),
        legacy_ignore: true,
        rewrite,
        ..PipelineSettings::default()
    }
}

fn pipeline<C: StylesheetCompiler>(compiler: C, rewrite: RewriteOptions) -> Pipeline<C> {
    Pipeline::new(compiler, settings(rewrite), registry()).with_fs(memory_fs())
}

const STYLESHEET: &str = "/* @entry */\n\
.logo{background:url(\"../img/logo.png\")}\n\
.icon{background:url(/static/icon.png)}\n\
@import \"widgets:base.css\";";

#[tokio::test]
async fn test_production_build_rewrites_with_digests() {
    let compiler = EchoCompiler::default();
    let pipeline = pipeline(&compiler, RewriteOptions::default());

    let outcome = pipeline
        .process(Path::new("/srv/app/css/main.scss"), STYLESHEET, &app())
        .await
        .unwrap();

    let expected = format!(
        "/* @entry */\n\
.logo{{background:url(\"/g/app/img/logo-2aae6c35c9.png\")}}\n\
.icon{{background:url(/static/icon.png)}}\n\
@import \"/g/widgets/base-{}.css\";",
        content_digest(b"x")
    );
    assert_eq!(outcome, Outcome::Compiled(expected));

    let calls = compiler.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].filename, PathBuf::from("/srv/app/css/main.scss"));
    assert!(calls[0].compress);
    assert!(!calls[0].source_map);
    assert_eq!(
        calls[0].paths,
        vec![
            PathBuf::from("/srv/app"),
            PathBuf::from("/srv/app/node_modules"),
            PathBuf::from("/srv"),
            PathBuf::from("/srv/node_modules"),
        ]
    );
}

#[tokio::test]
async fn test_development_build_keeps_plain_paths() {
    let compiler = EchoCompiler::default();
    let rewrite = RewriteOptions::new(
        Mode::Development,
        UrlPattern::with_prefix("/dev"),
        CacheBusting::ContentHash,
    )
    .unwrap();
    let pipeline = Pipeline::new(
        &compiler,
        PipelineSettings {
            development: true,
            ..settings(rewrite)
        },
        registry(),
    )
    .with_fs(memory_fs());

    let outcome = pipeline
        .process(
            Path::new("/srv/app/css/main.scss"),
            ".a{background:url(../img/logo.png?v=1)}",
            &app(),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Compiled(".a{background:url(/dev/app/img/logo.png?v=1)}".to_owned())
    );
    let calls = compiler.calls();
    assert!(!calls[0].compress);
    assert!(calls[0].source_map);
}

#[tokio::test]
async fn test_version_cache_busting() {
    let compiler = EchoCompiler::default();
    let rewrite = RewriteOptions::new(
        Mode::Production,
        UrlPattern::parse("//cdn.example.com/{name}/{version}/{path}"),
        CacheBusting::Version,
    )
    .unwrap();
    let pipeline = pipeline(&compiler, rewrite);

    let outcome = pipeline
        .process(Path::new("/srv/app/css/main.scss"), STYLESHEET, &app())
        .await
        .unwrap();

    let Outcome::Compiled(css) = outcome else {
        panic!("expected compiled output");
    };
    assert!(css.contains("url(\"//cdn.example.com/app/1.0.0/img/logo.png\")"));
    assert!(css.contains("@import \"//cdn.example.com/widgets/2.3.0/base.css\""));
}

#[tokio::test]
async fn test_skipped_files_are_not_compiled() {
    let compiler = EchoCompiler::default();
    let pipeline = pipeline(&compiler, RewriteOptions::default());

    let partial = pipeline
        .process(Path::new("/srv/app/css/_vars.scss"), "$a: 1;", &app())
        .await
        .unwrap();
    assert_eq!(partial, Outcome::Skipped(SkipReason::Partial));

    let disabled = pipeline
        .process(
            Path::new("/srv/app/css/ignore.scss"),
            "/* @compile: false */\n.a{}",
            &app(),
        )
        .await
        .unwrap();
    assert_eq!(disabled, Outcome::Skipped(SkipReason::CompileDisabled));

    let legacy = pipeline
        .process(
            Path::new("/srv/app/css/old.scss"),
            "/* !!cmd: ignore=true */\n.a{}",
            &app(),
        )
        .await
        .unwrap();
    assert_eq!(legacy, Outcome::Skipped(SkipReason::LegacyIgnore));

    assert!(compiler.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_module_is_fatal() {
    let compiler = EchoCompiler::default();
    let pipeline = pipeline(&compiler, RewriteOptions::default());

    let err = pipeline
        .process(
            Path::new("/srv/app/css/main.scss"),
            ".a{background:url(ghost:img/x.png)}",
            &app(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Rewrite(RewriteError::ModuleNotFound { ref module, .. }) if module == "ghost"
    ));
    assert!(err.to_string().contains("can not find module: ghost"));
}

#[tokio::test]
async fn test_compile_failure_is_propagated() {
    let pipeline = pipeline(FailingCompiler, RewriteOptions::default());

    let err = pipeline
        .process(Path::new("/srv/app/css/broken.scss"), ".a{", &app())
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Compile(_)));
    assert_eq!(
        err.to_string(),
        "/srv/app/css/broken.scss: Expected expression."
    );
}

#[tokio::test]
async fn test_grass_build_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("app/css")).unwrap();
    std::fs::create_dir_all(root.join("app/img")).unwrap();
    std::fs::create_dir_all(root.join("node_modules/theme")).unwrap();
    std::fs::write(root.join("app/img/logo.png"), "hello world").unwrap();
    std::fs::write(root.join("node_modules/theme/_colors.scss"), "$gap: 4px;").unwrap();

    let source = "@import \"theme/colors\";\n\
.logo { margin: $gap; background: url(../img/logo.png); }";
    let path = root.join("app/css/main.scss");
    std::fs::write(&path, source).unwrap();

    let module = ModuleInfo::new("app", root.join("app"));
    let resolver = Arc::new(ModuleRegistry::new().with_module(module.clone()));
    let settings = PipelineSettings {
        application_root: root.to_path_buf(),
        legacy_ignore: true,
        ..PipelineSettings::default()
    };
    let pipeline = Pipeline::new(GrassCompiler::new(), settings, resolver);

    let outcome = pipeline.process(&path, source, &module).await.unwrap();

    let Outcome::Compiled(css) = outcome else {
        panic!("expected compiled output");
    };
    assert_eq!(
        css.trim(),
        ".logo{margin:4px;background:url(/g/app/img/logo-2aae6c35c9.png)}"
    );
}

//! `assetline build` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetline_config::{CliSettings, Config};
use assetline_pipeline::{GrassCompiler, Outcome, Pipeline, PipelineError, PipelineSettings};
use assetline_rewrite::ModuleInfo;
use clap::Args;
use tokio::task::JoinSet;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Stylesheets to build.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path to configuration file (default: auto-discover assetline.toml).
    #[arg(short, long, env = "ASSETLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Development build: no compression, no content digests (overrides config).
    #[arg(long)]
    development: bool,

    /// Application root directory (overrides config).
    #[arg(long)]
    application_root: Option<PathBuf>,

    /// Output directory (default: print compiled CSS to stdout).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Enable verbose output (show build and skip logs).
    #[arg(short, long)]
    pub verbose: bool,
}

/// One file queued for building.
struct Job {
    path: PathBuf,
    source: String,
    module: ModuleInfo,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a file cannot be read or
    /// written, or any stylesheet fails to build.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            development: self.development.then_some(true),
            application_root: self.application_root.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let settings = PipelineSettings::from_config(&config)?;

        let jobs = self
            .files
            .iter()
            .map(|file| load_job(&config, file))
            .collect::<Result<Vec<_>, _>>()?;

        output.status(&format!(
            "Building {} stylesheet(s) ({})",
            jobs.len(),
            if config.development {
                "development"
            } else {
                "production"
            }
        ));
        if let Some(out_dir) = &self.out_dir {
            output.status(&format!("Output: {}", out_dir.display()));
        }

        let pipeline = Arc::new(Pipeline::new(
            GrassCompiler::new(),
            settings,
            Arc::new(config.modules.clone()),
        ));

        let mut tasks = JoinSet::new();
        for (index, job) in jobs.into_iter().enumerate() {
            let pipeline = Arc::clone(&pipeline);
            tasks.spawn(async move {
                let result = pipeline.process(&job.path, &job.source, &job.module).await;
                (index, job, result)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            results.push(joined?);
        }
        results.sort_by_key(|(index, _, _)| *index);

        let total = results.len();
        let mut failed = 0;
        for (_, job, result) in results {
            if let Err(err) = self.report(&output, &job, result) {
                output.error(&format!("{}: {err}", job.path.display()));
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(CliError::Validation(format!(
                "{failed} of {total} stylesheet(s) failed to build"
            )));
        }
        Ok(())
    }

    /// Write or print one file's outcome.
    fn report(
        &self,
        output: &Output,
        job: &Job,
        result: Result<Outcome, PipelineError>,
    ) -> Result<(), CliError> {
        match result? {
            Outcome::Skipped(reason) => {
                output.skipped(&job.path, reason);
            }
            Outcome::Compiled(css) => match &self.out_dir {
                Some(out_dir) => {
                    let dest = output_path(out_dir, &job.module, &job.path);
                    if let Some(parent) = dest.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&dest, css)?;
                    tracing::debug!(dest = %dest.display(), "Wrote stylesheet");
                    output.built(&job.path, &dest);
                }
                None => output.css(&css),
            },
        }
        Ok(())
    }
}

/// Read `file` and find the module that owns it.
fn load_job(config: &Config, file: &Path) -> Result<Job, CliError> {
    let path = std::path::absolute(file)?;
    let module = config
        .modules
        .module_for(&path)
        .cloned()
        .ok_or_else(|| {
            CliError::Validation(format!(
                "no module in [modules] owns {}",
                path.display()
            ))
        })?;
    let source = std::fs::read_to_string(&path)?;
    Ok(Job {
        path,
        source,
        module,
    })
}

/// Destination of a compiled stylesheet: `<out_dir>/<module>/<relative>.css`.
///
/// The relative part is taken from the module's asset root, falling back to
/// the module root and then the bare file name.
fn output_path(out_dir: &Path, module: &ModuleInfo, source: &Path) -> PathBuf {
    let relative = source
        .strip_prefix(module.asset_dir())
        .or_else(|_| source.strip_prefix(&module.path))
        .map_or_else(
            |_| PathBuf::from(source.file_name().unwrap_or_default()),
            Path::to_path_buf,
        );
    out_dir
        .join(&module.name)
        .join(relative)
        .with_extension("css")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path_under_module() {
        let module = ModuleInfo::new("app", "/srv/app");
        assert_eq!(
            output_path(Path::new("/out"), &module, Path::new("/srv/app/css/main.scss")),
            PathBuf::from("/out/app/css/main.css")
        );
    }

    #[test]
    fn test_output_path_relative_to_assets_root() {
        let module = ModuleInfo::new("app", "/srv/app").with_assets_root("assets");
        assert_eq!(
            output_path(
                Path::new("/out"),
                &module,
                Path::new("/srv/app/assets/css/main.sass")
            ),
            PathBuf::from("/out/app/css/main.css")
        );
        assert_eq!(
            output_path(Path::new("/out"), &module, Path::new("/srv/app/styles/x.scss")),
            PathBuf::from("/out/app/styles/x.css")
        );
    }

    #[test]
    fn test_output_path_outside_module() {
        let module = ModuleInfo::new("app", "/srv/app");
        assert_eq!(
            output_path(Path::new("/out"), &module, Path::new("/elsewhere/theme.scss")),
            PathBuf::from("/out/app/theme.css")
        );
    }

    #[test]
    fn test_load_job_requires_owning_module() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.scss");
        std::fs::write(&file, ".a{}").unwrap();

        let config = Config::default();
        let err = load_job(&config, &file).err().unwrap();
        assert!(err.to_string().contains("no module"));
    }

    #[test]
    fn test_load_job_with_relative_config_and_file() {
        let dir = tempfile::Builder::new()
            .prefix("assetline-build-")
            .tempdir_in(".")
            .unwrap();
        let project = PathBuf::from(dir.path().file_name().unwrap());
        std::fs::create_dir_all(project.join("css")).unwrap();
        std::fs::write(project.join("css/main.scss"), ".a{}").unwrap();
        std::fs::write(
            project.join("assetline.toml"),
            "[modules.app]\npath = \".\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&project.join("assetline.toml")), None).unwrap();
        let job = load_job(&config, &project.join("css/main.scss")).unwrap();

        assert_eq!(job.module.name, "app");
        assert_eq!(job.source, ".a{}");
        assert_eq!(
            output_path(Path::new("/out"), &job.module, &job.path),
            PathBuf::from("/out/app/css/main.css")
        );
    }
}

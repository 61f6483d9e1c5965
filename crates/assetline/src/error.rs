//! CLI error types.

use assetline_config::ConfigError;
use assetline_pipeline::PipelineError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("build task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Validation(String),
}

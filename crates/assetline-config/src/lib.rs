//! Configuration management for assetline.
//!
//! Parses `assetline.toml` with serde and discovers the file in the current
//! directory or its parents. CLI overrides are applied during load via
//! [`CliSettings`].
//!
//! ```toml
//! development = false
//! application_root = "."
//! legacy_ignore = true
//!
//! [assets]
//! prefix = "/g"
//! url_prefix = "https://${CDN_HOST}/g"
//! cache_busting = "content-hash"
//!
//! [compiler]
//! paths = ["shared/styles"]
//!
//! [modules.app]
//! path = "."
//! version = "1.4.0"
//! assets_root = "assets"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `assets.prefix`, `assets.url_prefix` and `assets.url_pattern` support
//! `${VAR}` and `${VAR:-default}`.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use assetline_rewrite::{
    CacheBusting, DEFAULT_PREFIX, Mode, ModuleInfo, ModuleRegistry, Placeholder,
    RewriteOptions, UrlPattern,
};
use serde::Deserialize;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override development mode.
    pub development: Option<bool>,
    /// Override the application root directory.
    pub application_root: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "assetline.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Development mode: no compression, inline source maps, no digests.
    pub development: bool,
    /// Treat a truthy `ignore` directive as a skip request.
    pub legacy_ignore: bool,
    /// Asset URL configuration.
    pub assets: AssetsConfig,
    /// Application root as written in TOML.
    #[serde(rename = "application_root")]
    application_root_raw: Option<String>,
    /// Compiler configuration (paths are relative strings from TOML).
    #[serde(rename = "compiler")]
    compiler_raw: CompilerConfigRaw,
    /// Module table (paths are relative strings from TOML).
    #[serde(rename = "modules")]
    modules_raw: BTreeMap<String, ModuleConfigRaw>,

    /// Resolved application root (set after loading).
    #[serde(skip)]
    pub application_root: PathBuf,
    /// Resolved compiler configuration (set after loading).
    #[serde(skip)]
    pub compiler: CompilerConfig,
    /// Resolved modules (set after loading).
    #[serde(skip)]
    pub modules: ModuleRegistry,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Asset URL configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// URL prefix used in development and as the production fallback.
    pub prefix: String,
    /// Production URL prefix.
    pub url_prefix: Option<String>,
    /// Production URL pattern (`{name}`, `{version}`, `{path}`).
    pub url_pattern: Option<String>,
    /// Cache invalidation strategy.
    pub cache_busting: CacheBusting,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            url_prefix: None,
            url_pattern: None,
            cache_busting: CacheBusting::default(),
        }
    }
}

impl AssetsConfig {
    /// URL pattern for the given build mode.
    ///
    /// Development always uses `<prefix>/{name}/{path}`. Production prefers
    /// `url_pattern`, then `url_prefix`, then `prefix`.
    #[must_use]
    pub fn url_pattern_for(&self, mode: Mode) -> UrlPattern {
        match mode {
            Mode::Development => UrlPattern::with_prefix(&self.prefix),
            Mode::Production => match &self.url_pattern {
                Some(pattern) => UrlPattern::parse(pattern),
                None => UrlPattern::with_prefix(self.url_prefix.as_deref().unwrap_or(&self.prefix)),
            },
        }
    }
}

/// Raw compiler configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CompilerConfigRaw {
    paths: Option<Vec<String>>,
    compress: Option<bool>,
    source_map: Option<bool>,
}

/// Resolved compiler configuration with absolute paths.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Extra include directories, searched before the module directories.
    pub paths: Vec<PathBuf>,
    /// Explicit compression setting (default: compress unless development).
    pub compress: Option<bool>,
    /// Explicit source map setting (default: inline maps in development).
    pub source_map: Option<bool>,
}

/// Raw module entry as parsed from TOML.
#[derive(Debug, Deserialize)]
struct ModuleConfigRaw {
    path: String,
    version: Option<String>,
    #[serde(default)]
    assets_root: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`assets.url_prefix`").
        field: String,
        /// Error message (e.g., "${`CDN_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `assetline.toml` in the current directory and
    /// its parents, falling back to defaults rooted at the current directory.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Build mode selected by the `development` flag.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.development {
            Mode::Development
        } else {
            Mode::Production
        }
    }

    /// Rewrite options for the current mode.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the URL pattern conflicts with the
    /// cache busting strategy.
    pub fn rewrite_options(&self) -> Result<RewriteOptions, ConfigError> {
        let mode = self.mode();
        RewriteOptions::new(
            mode,
            self.assets.url_pattern_for(mode),
            self.assets.cache_busting,
        )
        .map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(development) = settings.development {
            self.development = development;
        }
        if let Some(root) = &settings.application_root {
            self.application_root = std::path::absolute(root).unwrap_or_else(|_| root.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config rooted at the current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config rooted at `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            development: false,
            legacy_ignore: true,
            assets: AssetsConfig::default(),
            application_root_raw: None,
            compiler_raw: CompilerConfigRaw::default(),
            modules_raw: BTreeMap::new(),
            application_root: base.to_path_buf(),
            compiler: CompilerConfig::default(),
            modules: ModuleRegistry::new(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        // Resolved paths are absolute even when `path` is relative.
        let config_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        config.resolve_paths(&std::path::absolute(config_dir)?)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_assets()?;
        self.rewrite_options()?;
        Ok(())
    }

    fn validate_assets(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.assets.prefix, "assets.prefix")?;
        if let Some(url_prefix) = &self.assets.url_prefix {
            require_non_empty(url_prefix, "assets.url_prefix")?;
        }
        if let Some(pattern) = &self.assets.url_pattern
            && !UrlPattern::parse(pattern).has_placeholder(Placeholder::Path)
        {
            return Err(ConfigError::Validation(format!(
                "assets.url_pattern `{pattern}` must contain {{path}}"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.assets.prefix = expand::expand_env(&self.assets.prefix, "assets.prefix")?;
        expand::expand_opt(&mut self.assets.url_prefix, "assets.url_prefix")?;
        expand::expand_opt(&mut self.assets.url_pattern, "assets.url_pattern")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.application_root = match self.application_root_raw.as_deref() {
            Some(root) => config_dir.join(root),
            None => config_dir.to_path_buf(),
        };

        self.compiler = CompilerConfig {
            paths: self
                .compiler_raw
                .paths
                .iter()
                .flatten()
                .map(|p| config_dir.join(p))
                .collect(),
            compress: self.compiler_raw.compress,
            source_map: self.compiler_raw.source_map,
        };

        let mut modules = ModuleRegistry::new();
        for (name, raw) in &self.modules_raw {
            require_non_empty(&raw.path, &format!("modules.{name}.path"))?;
            let mut module = ModuleInfo::new(name.clone(), config_dir.join(&raw.path))
                .with_assets_root(&raw.assets_root);
            module.version.clone_from(&raw.version);
            modules.insert(module);
        }
        self.modules = modules;

        Ok(())
    }
}

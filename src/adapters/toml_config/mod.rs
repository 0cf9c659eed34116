// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::{Toolchain, DEFAULT_OUTPUT, DEFAULT_WORKING_DIR};
use crate::error::{EasyVideoError, EasyVideoResult};
use crate::registry::params::Switch;
use crate::registry::BuildOptions;
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// Name of the per-directory config file
pub const LOCAL_CONFIG_FILE: &str = "easyvideo.toml";

/// Environment variables and the keys they override
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("EASYVIDEO_OUTPUT", "output"),
    ("EASYVIDEO_WORKING_DIR", "working_dir"),
    ("EASYVIDEO_OVERWRITE", "overwrite"),
    ("EASYVIDEO_LOG_LEVEL", "log_level"),
];

/// Effective configuration of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EasyVideoConfig {
    /// Output path used when the command line names none
    pub output: String,
    /// Directory for intermediate artifacts
    pub working_dir: PathBuf,
    /// Let the transcoder replace existing output files
    pub overwrite: bool,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    /// External tool program names
    pub tools: Toolchain,
}

impl Default for EasyVideoConfig {
    fn default() -> Self {
        Self {
            output: DEFAULT_OUTPUT.to_string(),
            working_dir: PathBuf::from(DEFAULT_WORKING_DIR),
            overwrite: true,
            log_level: LogLevel::Info,
            log_format: LogFormat::Pretty,
            tools: Toolchain::default(),
        }
    }
}

impl EasyVideoConfig {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            tools: self.tools.clone(),
            overwrite: self.overwrite,
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level,
            format: self.log_format,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    easyvideo: EasyVideoConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse config file content
    pub fn from_toml_str(content: &str) -> EasyVideoResult<EasyVideoConfig> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| EasyVideoError::Config {
            message: format!("failed to parse TOML config: {}", e),
        })?;
        Ok(file.easyvideo)
    }

    /// Read and parse one config file
    pub fn load_file(path: &Path) -> EasyVideoResult<EasyVideoConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| EasyVideoError::Config {
            message: format!("failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Candidate config locations, most specific first
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(dir).join("easyvideo").join("config.toml"));
        } else if let Some(home) = std::env::var_os("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("easyvideo")
                    .join("config.toml"),
            );
        }
        paths
    }

    /// Load `explicit` if given (it must exist), else the first default
    /// location that exists, else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> EasyVideoResult<EasyVideoConfig> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(EasyVideoError::Config {
                    message: format!("config file does not exist: {}", path.display()),
                });
            }
            info!("Loading configuration from: {}", path.display());
            return Self::load_file(path);
        }

        for path in Self::default_config_paths() {
            if path.is_file() {
                info!("Loading configuration from: {}", path.display());
                return Self::load_file(&path);
            }
        }

        debug!("no config file found, using defaults");
        Ok(EasyVideoConfig::default())
    }

    /// Apply `EASYVIDEO_*` overrides read through `lookup`
    pub fn apply_env<F>(config: &mut EasyVideoConfig, lookup: F) -> EasyVideoResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        for &(var, key) in ENV_OVERRIDES {
            let Some(value) = lookup(var) else {
                continue;
            };
            debug!("Found environment override: {} = {}", var, value);
            match key {
                "output" => config.output = value,
                "working_dir" => config.working_dir = PathBuf::from(value),
                "overwrite" => {
                    let Switch(enabled) = value.parse().map_err(|e| EasyVideoError::Config {
                        message: format!("{}: {}", var, e),
                    })?;
                    config.overwrite = enabled;
                }
                "log_level" => config.log_level = value.parse()?,
                _ => continue,
            }
            applied += 1;
        }
        Ok(applied)
    }
}

//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Command line overrides (merged by the binary)
//! 2. Environment variables (DAYFETCH_*)
//! 3. TOML config file (explicit path, or DAYFETCH_CONFIG_FILE)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Value},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Root of the ECDC download area.
pub const DEFAULT_URL_ROOT: &str = "https://www.ecdc.europa.eu/sites/default/files/documents/";

/// File name prefix of the published dataset, spelling included.
pub const DEFAULT_FILENAME_PREFIX: &str = "COVID-19-geographic-disbtribution-worldwide-";

/// Environment variable naming a TOML config file.
pub const CONFIG_FILE_ENV: &str = "DAYFETCH_CONFIG_FILE";

/// Prefix of every configuration environment variable.
const ENV_PREFIX: &str = "DAYFETCH_";

/// Free-text keys whose environment values are taken as written. figment
/// would otherwise read `DAYFETCH_FILENAME_PREFIX=2020` as an integer.
const VERBATIM_ENV_KEYS: [&str; 3] = ["url_root", "filename_prefix", "user_agent"];

/// Application configuration.
///
/// Built once at start-up and handed to the resolver by reference; nothing
/// reads it from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Download link root, joined directly with the file name.
    ///
    /// Set via DAYFETCH_URL_ROOT environment variable.
    #[serde(default = "default_url_root")]
    pub url_root: String,

    /// Prefix shared by remote and cached file names.
    ///
    /// Set via DAYFETCH_FILENAME_PREFIX environment variable.
    #[serde(default = "default_filename_prefix")]
    pub filename_prefix: String,

    /// Download attempts per day before giving up on it.
    ///
    /// Set via DAYFETCH_RETRY_LIMIT environment variable.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Number of earlier days to try when today's file is unavailable (0 disables).
    ///
    /// Set via DAYFETCH_FALLBACK_DAYS environment variable.
    #[serde(default = "default_fallback_days")]
    pub fallback_days: u32,

    /// Per-attempt HTTP timeout in milliseconds.
    ///
    /// Set via DAYFETCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via DAYFETCH_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum accepted response body in bytes.
    ///
    /// Set via DAYFETCH_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Directory holding the date-stamped cache files.
    ///
    /// Set via DAYFETCH_CACHE_DIR environment variable.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Process exit code when no file could be obtained. Use 0 for cron jobs
    /// that treat "no new data" as a normal run.
    ///
    /// Set via DAYFETCH_EXHAUSTED_EXIT_CODE environment variable.
    #[serde(default = "default_exhausted_exit_code")]
    pub exhausted_exit_code: u8,
}

fn default_url_root() -> String {
    DEFAULT_URL_ROOT.into()
}

fn default_filename_prefix() -> String {
    DEFAULT_FILENAME_PREFIX.into()
}

fn default_retry_limit() -> u32 {
    3
}

fn default_fallback_days() -> u32 {
    1
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_user_agent() -> String {
    concat!("dayfetch/", env!("CARGO_PKG_VERSION")).into()
}

fn default_max_bytes() -> usize {
    52_428_800 // 50MB
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_exhausted_exit_code() -> u8 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            url_root: default_url_root(),
            filename_prefix: default_filename_prefix(),
            retry_limit: default_retry_limit(),
            fallback_days: default_fallback_days(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            cache_dir: default_cache_dir(),
            exhausted_exit_code: default_exhausted_exit_code(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build the layered figment without extracting it.
    ///
    /// Callers with their own highest-priority layer (command line flags)
    /// merge it on top and finish with [`AppConfig::from_figment`].
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match config_file {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        let mut ignored = vec!["config_file"];
        ignored.extend(VERBATIM_ENV_KEYS);

        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&ignored)).merge(Serialized::defaults(verbatim_env()))
    }

    /// Extract and validate a configuration from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if a layer cannot be read or parsed,
    /// and `ConfigError::Invalid` if validation fails after merging.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from defaults, config file and environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment(config_file))
    }
}

/// String values of the [`VERBATIM_ENV_KEYS`] variables that are set.
fn verbatim_env() -> Dict {
    let mut dict = Dict::new();
    for key in VERBATIM_ENV_KEYS {
        if let Ok(value) = std::env::var(format!("{ENV_PREFIX}{}", key.to_uppercase())) {
            dict.insert(key.to_string(), Value::from(value));
        }
    }
    dict
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.url_root, DEFAULT_URL_ROOT);
        assert_eq!(config.filename_prefix, DEFAULT_FILENAME_PREFIX);
        assert_eq!(config.retry_limit, 3);
        assert_eq!(config.fallback_days, 1);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_bytes, 52_428_800);
        assert_eq!(config.cache_dir, PathBuf::from("."));
        assert_eq!(config.exhausted_exit_code, 1);
        assert!(config.user_agent.starts_with("dayfetch/"));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_toml_layer_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("retry_limit = 5\nfallback_days = 7\nfilename_prefix = \"daily-\""));

        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.retry_limit, 5);
        assert_eq!(config.fallback_days, 7);
        assert_eq!(config.filename_prefix, "daily-");
        assert_eq!(config.url_root, DEFAULT_URL_ROOT);
    }

    #[test]
    fn test_invalid_layer_is_rejected_after_merge() {
        let figment =
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string("retry_limit = 0"));

        let result = AppConfig::from_figment(figment);
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "retry_limit"));
    }

    #[test]
    fn test_malformed_layer_fails_to_load() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("retry_limit = \"many\""));

        let result = AppConfig::from_figment(figment);
        assert!(matches!(result, Err(ConfigError::LoadFailed(_))));
    }

    #[test]
    fn test_missing_explicit_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let figment = AppConfig::figment(Some(&dir.path().join("absent.toml")));
        let config: AppConfig = figment.extract().unwrap();
        assert_eq!(config.retry_limit, 3);
    }

    #[test]
    fn test_explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dayfetch.toml");
        std::fs::write(&path, "url_root = \"http://mirror.test/files/\"\nexhausted_exit_code = 0\n").unwrap();

        let config: AppConfig = AppConfig::figment(Some(&path)).extract().unwrap();
        assert_eq!(config.url_root, "http://mirror.test/files/");
        assert_eq!(config.exhausted_exit_code, 0);
    }

    #[test]
    fn test_numeric_env_strings_are_kept_verbatim() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DAYFETCH_FILENAME_PREFIX", "2020");
            jail.set_env("DAYFETCH_USER_AGENT", "007");
            jail.set_env("DAYFETCH_RETRY_LIMIT", "4");

            let config: AppConfig = AppConfig::figment(None).extract()?;
            assert_eq!(config.filename_prefix, "2020");
            assert_eq!(config.user_agent, "007");
            assert_eq!(config.retry_limit, 4);
            assert_eq!(config.url_root, DEFAULT_URL_ROOT);
            Ok(())
        });
    }
}

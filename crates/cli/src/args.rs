//! Command line arguments and their configuration layer.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use dayfetch_core::{AppConfig, ConfigError};
use figment::providers::Serialized;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "dayfetch")]
#[command(about = "Downloader for the geographic distribution of COVID-19 cases dataset from the ECDC website")]
#[command(version, disable_version_flag = true)]
pub struct Args {
    /// Count of earlier days to try when today's file is unavailable (default is 1, 0 is no fallback)
    #[arg(short, long, value_name = "DAYS")]
    pub fallback_days: Option<u32>,

    /// xlsx file prefix (default is "COVID-19-geographic-disbtribution-worldwide-")
    #[arg(short, long, value_name = "NAME")]
    pub prefix: Option<String>,

    /// Download link root (default is "https://www.ecdc.europa.eu/sites/default/files/documents/")
    #[arg(short, long, value_name = "NAME")]
    pub root_link: Option<String>,

    /// Download attempts per day (default is 3)
    #[arg(short, long, value_name = "TRIES")]
    pub try_limit: Option<u32>,

    /// TOML config file (default: $DAYFETCH_CONFIG_FILE if set)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-attempt timeout in milliseconds (default is 20000)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Directory for cached files (default is the current directory)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Exit code when no file could be obtained (default is 1)
    #[arg(long, value_name = "CODE")]
    pub exhausted_exit_code: Option<u8>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

/// Flags given on the command line, keyed like [`AppConfig`] fields.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    url_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exhausted_exit_code: Option<u8>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            url_root: self.root_link.clone(),
            filename_prefix: self.prefix.clone(),
            retry_limit: self.try_limit,
            fallback_days: self.fallback_days,
            timeout_ms: self.timeout_ms,
            cache_dir: self.cache_dir.clone(),
            exhausted_exit_code: self.exhausted_exit_code,
        }
    }

    /// Load the layered configuration with explicit flags on top.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let figment = AppConfig::figment(self.config.as_deref()).merge(Serialized::defaults(self.overrides()));
        AppConfig::from_figment(figment)
    }
}

//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from flags, environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// The URL root and file prefix are only checked for shape; the naming
    /// function joins them verbatim.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `retry_limit` is 0
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_bytes` is 0 or exceeds 512MB
    /// - `user_agent` is empty
    /// - `url_root` is not an http(s) link
    /// - `filename_prefix` contains a path separator
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_limit == 0 {
            return Err(ConfigError::Invalid { field: "retry_limit".into(), reason: "must be at least 1".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 512 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 512MB".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !(self.url_root.starts_with("http://") || self.url_root.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "url_root".into(),
                reason: "must start with http:// or https://".into(),
            });
        }

        if self.filename_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                field: "filename_prefix".into(),
                reason: "must not contain path separators".into(),
            });
        }

        if !self.url_root.ends_with('/') {
            tracing::warn!(
                url_root = %self.url_root,
                "url_root does not end with '/'; file names are appended to it as-is"
            );
        }

        if self.fallback_days > 366 {
            tracing::warn!(fallback_days = self.fallback_days, "fallback window is longer than a year");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_retry_limit_zero() {
        let config = AppConfig { retry_limit: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "retry_limit"));
    }

    #[test]
    fn test_validate_fallback_disabled_is_valid() {
        let config = AppConfig { fallback_days: 0, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_url_root_scheme() {
        let config = AppConfig { url_root: "ftp://example.com/files/".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "url_root"));

        let config = AppConfig { url_root: "http://example.com/files/".into(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_url_root_without_trailing_slash_is_allowed() {
        let config = AppConfig { url_root: "https://example.com/files".into(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_prefix_with_separator() {
        let config = AppConfig { filename_prefix: "../escape-".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "filename_prefix"));
    }

    #[test]
    fn test_validate_empty_prefix_is_allowed() {
        let config = AppConfig { filename_prefix: String::new(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { retry_limit: 1, timeout_ms: 100, max_bytes: 1, ..Default::default() };
        assert!(config.validate().is_ok());

        let config = AppConfig { timeout_ms: 300_000, max_bytes: 512 * 1024 * 1024, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}

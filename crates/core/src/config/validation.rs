//! Range checks applied to a loaded [`AppConfig`].

use thiserror::Error;

use crate::config::AppConfig;

/// Largest accepted page body cap.
const MAX_PAGE_BYTES: usize = 50 * 1024 * 1024;

/// Bounds shared by every timeout field, in milliseconds.
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=300_000;

const MAX_REDIRECT_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Reject values no component can work with.
    ///
    /// Byte caps must be non-zero (pages at most 50MB), timeouts fall within
    /// 100ms..=5min, redirects at most 10, and the user agent and API base URL
    /// must be non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 || self.max_bytes > MAX_PAGE_BYTES {
            return Err(invalid("max_bytes", format!("must be between 1 and {MAX_PAGE_BYTES}")));
        }
        if self.max_body_bytes == 0 {
            return Err(invalid("max_body_bytes", "must be greater than 0"));
        }

        let timeouts = [
            ("fetch_timeout_ms", self.fetch_timeout_ms),
            ("generation_timeout_ms", self.generation_timeout_ms),
            ("vision_timeout_ms", self.vision_timeout_ms),
        ];
        if let Some((field, value)) = timeouts.into_iter().find(|(_, v)| !TIMEOUT_RANGE_MS.contains(v)) {
            return Err(invalid(
                field,
                format!("{value}ms is outside {}..={}ms", TIMEOUT_RANGE_MS.start(), TIMEOUT_RANGE_MS.end()),
            ));
        }

        if self.max_redirects > MAX_REDIRECT_LIMIT {
            return Err(invalid("max_redirects", format!("must not exceed {MAX_REDIRECT_LIMIT}")));
        }
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.openai_base_url.trim().is_empty() {
            return Err(invalid("openai_base_url", "must not be empty"));
        }

        if !self.block_private_hosts {
            tracing::warn!("block_private_hosts is disabled; product URLs may reach internal addresses");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_field(config: AppConfig) -> String {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_pass() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_page_byte_cap_bounds() {
        assert_eq!(rejected_field(AppConfig { max_bytes: 0, ..Default::default() }), "max_bytes");
        assert_eq!(rejected_field(AppConfig { max_bytes: MAX_PAGE_BYTES + 1, ..Default::default() }), "max_bytes");
    }

    #[test]
    fn test_request_body_cap_non_zero() {
        assert_eq!(rejected_field(AppConfig { max_body_bytes: 0, ..Default::default() }), "max_body_bytes");
    }

    #[test]
    fn test_each_timeout_checked() {
        assert_eq!(rejected_field(AppConfig { fetch_timeout_ms: 50, ..Default::default() }), "fetch_timeout_ms");
        assert_eq!(
            rejected_field(AppConfig { generation_timeout_ms: 301_000, ..Default::default() }),
            "generation_timeout_ms"
        );
        assert_eq!(rejected_field(AppConfig { vision_timeout_ms: 0, ..Default::default() }), "vision_timeout_ms");
    }

    #[test]
    fn test_redirect_limit() {
        assert_eq!(rejected_field(AppConfig { max_redirects: 11, ..Default::default() }), "max_redirects");
    }

    #[test]
    fn test_blank_strings_rejected() {
        assert_eq!(rejected_field(AppConfig { user_agent: "  ".into(), ..Default::default() }), "user_agent");
        assert_eq!(rejected_field(AppConfig { openai_base_url: String::new(), ..Default::default() }), "openai_base_url");
    }

    #[test]
    fn test_boundary_values_pass() {
        let config = AppConfig {
            max_bytes: 1,
            fetch_timeout_ms: 100,
            vision_timeout_ms: 300_000,
            max_redirects: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}

//! Configuration for the Obscura service client.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config across workflows, serialise it for logging, and diff two
//! runs to understand why their outcomes differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! well-documented defaults for the rest; `build()` is the single place where
//! constraints are checked.

use crate::error::SubmitError;
use serde::{Deserialize, Serialize};

/// Configuration for the Obscura service client.
///
/// Built via [`ClientConfig::builder()`] or using
/// [`ClientConfig::default()`].
///
/// # Example
/// ```rust
/// use obscura_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://blur.internal:5000")
///     .request_timeout_secs(600)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the anonymization service. Default: `http://localhost:5000`.
    ///
    /// Endpoint paths from the request descriptors are appended to this
    /// value, so it must not carry a trailing slash beyond the authority.
    pub base_url: String,

    /// Whole-request timeout in seconds. Default: 300.
    ///
    /// The backend operations are media transforms — blurring every frame of
    /// a video routinely takes minutes. A short HTTP timeout would abort
    /// perfectly healthy requests, so the default is deliberately generous.
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds. Default: 10.
    ///
    /// Unlike the request timeout, connecting should be fast; a long connect
    /// stall almost always means a wrong base URL or a down service.
    pub connect_timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 300,
            connect_timeout_secs: 10,
            user_agent: concat!("obscura-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Join an endpoint path onto the base URL.
    pub(crate) fn endpoint_url(&self, endpoint_path: &str) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            endpoint_path
        )
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs.max(1);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, SubmitError> {
        let c = &self.config;
        if c.base_url.trim().is_empty() {
            return Err(SubmitError::InvalidConfig("Base URL must not be empty".into()));
        }
        if reqwest::Url::parse(&c.base_url).is_err() {
            return Err(SubmitError::InvalidConfig(format!(
                "Base URL '{}' is not a valid URL",
                c.base_url
            )));
        }
        if c.request_timeout_secs == 0 {
            return Err(SubmitError::InvalidConfig(
                "Request timeout must be ≥ 1s".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_localhost() {
        let c = ClientConfig::default();
        assert_eq!(c.base_url, "http://localhost:5000");
        assert_eq!(c.request_timeout_secs, 300);
    }

    #[test]
    fn builder_rejects_bad_url() {
        let err = ClientConfig::builder().base_url("not a url").build();
        assert!(matches!(err, Err(SubmitError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_empty_url() {
        let err = ClientConfig::builder().base_url("  ").build();
        assert!(matches!(err, Err(SubmitError::InvalidConfig(_))));
    }

    #[test]
    fn endpoint_url_handles_trailing_slash() {
        let c = ClientConfig::builder()
            .base_url("http://localhost:5000/")
            .build()
            .unwrap();
        assert_eq!(c.endpoint_url("/redact-pdf"), "http://localhost:5000/redact-pdf");
    }

    #[test]
    fn timeouts_clamped_to_at_least_one_second() {
        let c = ClientConfig::builder()
            .request_timeout_secs(0)
            .connect_timeout_secs(0)
            .build()
            .unwrap();
        assert_eq!(c.request_timeout_secs, 1);
        assert_eq!(c.connect_timeout_secs, 1);
    }
}

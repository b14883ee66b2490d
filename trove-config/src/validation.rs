use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::ClientConfig;

/// Settings that would leave the client unusable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("api.base_url {url:?} is not a valid http(s) URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("api.request_timeout must be greater than zero")]
    ZeroTimeout,
    #[error("commit.max_description_words must be greater than zero")]
    ZeroDescriptionBudget,
}

impl ClientConfig {
    /// Check guard rails. Expects `api.base_url` to be normalized already.
    pub fn validate(&self) -> Result<(), ConfigGuardRailError> {
        match Url::parse(&self.api.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {}
            Ok(url) => {
                return Err(ConfigGuardRailError::InvalidBaseUrl {
                    url: self.api.base_url.clone(),
                    reason: format!("unsupported scheme or missing host ({})", url.scheme()),
                });
            }
            Err(err) => {
                return Err(ConfigGuardRailError::InvalidBaseUrl {
                    url: self.api.base_url.clone(),
                    reason: err.to_string(),
                });
            }
        }

        if self.api.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigGuardRailError::ZeroTimeout);
        }

        if self.commit.max_description_words == 0 {
            return Err(ConfigGuardRailError::ZeroDescriptionBudget);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_guard_rails() {
        assert_eq!(ClientConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_http_urls_and_zero_values() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://files.example.com".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigGuardRailError::InvalidBaseUrl { .. })
        ));

        let mut config = ClientConfig::default();
        config.api.request_timeout = Some(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigGuardRailError::ZeroTimeout));

        let mut config = ClientConfig::default();
        config.commit.max_description_words = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigGuardRailError::ZeroDescriptionBudget)
        );
    }
}

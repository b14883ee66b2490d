use serde::{Deserialize, Serialize};
use std::time::Duration;
use trove_model::FieldLimits;
use trove_model::listing::DEFAULT_MAX_DESCRIPTION_WORDS;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOG_FILTER: &str = "info";

fn default_user_agent() -> String {
    concat!("trove/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Top-level client settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub media: MediaConfig,
    pub commit: CommitConfig,
    pub logging: LoggingConfig,
}

/// Where the marketplace API lives and how requests are sent to it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the listing and media endpoints. A missing scheme is
    /// filled in with `http://` during normalization.
    pub base_url: String,
    /// Per-request timeout for the HTTP client. Unset means requests may
    /// wait indefinitely, matching the cache and coordinator which impose
    /// no timeouts of their own.
    #[serde(with = "humantime_opt", skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Media cache behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Share one in-flight fetch between bindings that ask for the same
    /// listing and token at the same time.
    pub coalesce_fetches: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            coalesce_fetches: true,
        }
    }
}

/// Listing commit rules applied before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommitConfig {
    /// Refuse to create a listing without a photo.
    pub require_photo_on_create: bool,
    pub max_description_words: usize,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            require_photo_on_create: false,
            max_description_words: DEFAULT_MAX_DESCRIPTION_WORDS,
        }
    }
}

impl CommitConfig {
    pub fn field_limits(&self) -> FieldLimits {
        FieldLimits {
            max_description_words: self.max_description_words,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// `Option<Duration>` as a humantime string (`"30s"`, `"1m 30s"`).
mod humantime_opt {
    use serde::{Deserialize, Deserializer, Serializer, de};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer
                .serialize_str(&humantime::format_duration(*duration).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => humantime::parse_duration(text.trim())
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}

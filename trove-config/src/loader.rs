use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ConfigLoadError;
use crate::models::ClientConfig;
use crate::util::{normalize_base_url, parse_bool};

pub const CONFIG_PATH_VAR: &str = "TROVE_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "TROVE_CONFIG_JSON";
pub const API_URL_VAR: &str = "TROVE_API_URL";
pub const REQUEST_TIMEOUT_VAR: &str = "TROVE_REQUEST_TIMEOUT";
pub const REQUIRE_PHOTO_VAR: &str = "TROVE_REQUIRE_PHOTO";
pub const LOG_VAR: &str = "TROVE_LOG";

const DEFAULT_FILES: &[&str] = &[
    "trove.toml",
    "trove.json",
    "config/trove.toml",
    "config/trove.json",
];

/// Apply the nearest `.env` file to the process environment.
///
/// `Ok(false)` when there is none; a file that exists but does not parse is
/// an error.
pub fn load_env_file() -> Result<bool, ConfigLoadError> {
    match dotenvy::dotenv() {
        Ok(path) => {
            info!(path = %path.display(), "loaded .env file");
            Ok(true)
        }
        Err(err) if err.not_found() => Ok(false),
        Err(err) => Err(ConfigLoadError::EnvFile(err)),
    }
}

/// Source that produced the base configuration (before env overrides).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClientConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Loaded configuration plus how it was found.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: ClientConfig,
    pub source: ClientConfigSource,
    pub env_file_loaded: bool,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// Evaluation order:
    /// 1) `.env` in the working directory, if present,
    /// 2) `$TROVE_CONFIG_PATH` (TOML or JSON file),
    /// 3) `$TROVE_CONFIG_JSON` (inline JSON),
    /// 4) `trove.toml` / `config/trove.toml` in the working directory,
    /// 5) defaults.
    ///
    /// Individual `TROVE_*` variables are applied on top, then the result is
    /// normalized and validated.
    pub fn load_from_env() -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = load_env_file()?;
        let mut load = Self::load_with(|name| std::env::var(name).ok(), Path::new("."))?;
        load.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Same as [`ClientConfig::load_from_env`] without the `.env` step, with
    /// variables supplied by `lookup` and default files searched under `root`.
    pub fn load_with<F>(lookup: F, root: &Path) -> Result<ConfigLoad, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|raw| !raw.trim().is_empty());

        let (mut config, source) = if let Some(path) = present(CONFIG_PATH_VAR) {
            let path = PathBuf::from(path);
            (Self::load_from_file(&path)?, ClientConfigSource::EnvPath(path))
        } else if let Some(raw) = present(CONFIG_JSON_VAR) {
            (Self::parse_json(&raw, CONFIG_JSON_VAR)?, ClientConfigSource::EnvInline)
        } else if let Some(path) = Self::find_default_file(root) {
            (Self::load_from_file(&path)?, ClientConfigSource::File(path))
        } else {
            (Self::default(), ClientConfigSource::Default)
        };

        config.apply_overrides(&present)?;
        config.api.base_url = normalize_base_url(&config.api.base_url);
        config.validate()?;

        debug!(source = ?source, base_url = %config.api.base_url, "client configuration loaded");
        Ok(ConfigLoad {
            config,
            source,
            env_file_loaded: false,
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::FileIo {
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents, &origin),
            Some("toml") => toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                origin,
                message: err.to_string(),
            }),
            _ => Self::parse_from_str(&contents, &origin),
        }
    }

    /// Try TOML first, then JSON.
    pub fn parse_from_str(contents: &str, origin: &str) -> Result<Self, ConfigLoadError> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| ConfigLoadError::Parse {
                origin: origin.to_string(),
                message: format!("toml error: {toml_err}; json error: {json_err}"),
            })
        })
    }

    pub fn parse_json(raw: &str, origin: &str) -> Result<Self, ConfigLoadError> {
        serde_json::from_str(raw).map_err(|err| ConfigLoadError::Parse {
            origin: origin.to_string(),
            message: err.to_string(),
        })
    }

    fn apply_overrides<F>(&mut self, present: &F) -> Result<(), ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = present(API_URL_VAR) {
            self.api.base_url = url;
        }

        if let Some(raw) = present(REQUEST_TIMEOUT_VAR) {
            let timeout = humantime::parse_duration(raw.trim()).map_err(|err| {
                ConfigLoadError::EnvVar {
                    var: REQUEST_TIMEOUT_VAR,
                    message: err.to_string(),
                }
            })?;
            self.api.request_timeout = Some(timeout);
        }

        if let Some(raw) = present(REQUIRE_PHOTO_VAR) {
            self.commit.require_photo_on_create =
                parse_bool(&raw).ok_or_else(|| ConfigLoadError::EnvVar {
                    var: REQUIRE_PHOTO_VAR,
                    message: format!("expected a boolean, got {raw:?}"),
                })?;
        }

        if let Some(filter) = present(LOG_VAR) {
            self.logging.filter = filter;
        }

        Ok(())
    }

    fn find_default_file(root: &Path) -> Option<PathBuf> {
        DEFAULT_FILES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let load = ClientConfig::load_with(lookup(&[]), dir.path()).unwrap();
        assert_eq!(load.source, ClientConfigSource::Default);
        assert_eq!(load.config.api.base_url, "http://localhost:8080");
        assert_eq!(load.config.api.request_timeout, None);
        assert!(!load.config.commit.require_photo_on_create);
    }

    #[test]
    fn reads_default_toml_file_under_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("trove.toml"),
            "[api]\nbase_url = \"market.example.com/\"\nrequest_timeout = \"45s\"\n\n[commit]\nmax_description_words = 80\n",
        )
        .unwrap();

        let load = ClientConfig::load_with(lookup(&[]), dir.path()).unwrap();
        assert_eq!(
            load.source,
            ClientConfigSource::File(dir.path().join("trove.toml"))
        );
        assert_eq!(load.config.api.base_url, "http://market.example.com");
        assert_eq!(load.config.api.request_timeout, Some(Duration::from_secs(45)));
        assert_eq!(load.config.commit.max_description_words, 80);
        assert!(load.config.media.coalesce_fetches);
    }

    #[test]
    fn explicit_path_beats_inline_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{"commit":{"require_photo_on_create":true}}"#).unwrap();
        let path_str = path.display().to_string();

        let load = ClientConfig::load_with(
            lookup(&[
                (CONFIG_PATH_VAR, path_str.as_str()),
                (CONFIG_JSON_VAR, r#"{"logging":{"filter":"trace"}}"#),
            ]),
            dir.path(),
        )
        .unwrap();
        assert_eq!(load.source, ClientConfigSource::EnvPath(path));
        assert!(load.config.commit.require_photo_on_create);
        assert_eq!(load.config.logging.filter, "info");
    }

    #[test]
    fn env_overrides_apply_on_top_of_inline_json() {
        let dir = tempfile::tempdir().unwrap();
        let load = ClientConfig::load_with(
            lookup(&[
                (CONFIG_JSON_VAR, r#"{"api":{"base_url":"http://one"}}"#),
                (API_URL_VAR, "https://two.example.com"),
                (REQUEST_TIMEOUT_VAR, "1m 30s"),
                (REQUIRE_PHOTO_VAR, "yes"),
                (LOG_VAR, "trove_core=debug"),
            ]),
            dir.path(),
        )
        .unwrap();
        assert_eq!(load.source, ClientConfigSource::EnvInline);
        assert_eq!(load.config.api.base_url, "https://two.example.com");
        assert_eq!(load.config.api.request_timeout, Some(Duration::from_secs(90)));
        assert!(load.config.commit.require_photo_on_create);
        assert_eq!(load.config.logging.filter, "trove_core=debug");
    }

    #[test]
    fn bad_override_values_are_reported_by_variable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_with(lookup(&[(REQUIRE_PHOTO_VAR, "perhaps")]), dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::EnvVar { var: REQUIRE_PHOTO_VAR, .. }
        ));

        let err = ClientConfig::load_with(lookup(&[(REQUEST_TIMEOUT_VAR, "soon")]), dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::EnvVar { var: REQUEST_TIMEOUT_VAR, .. }
        ));
    }

    #[test]
    fn guard_rails_run_after_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::load_with(lookup(&[(REQUEST_TIMEOUT_VAR, "0s")]), dir.path())
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::GuardRail(_)));
    }

    #[test]
    fn unparsable_files_name_their_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.conf");
        fs::write(&path, "this is = = not config").unwrap();
        let err = ClientConfig::load_from_file(&path).unwrap_err();
        match err {
            ConfigLoadError::Parse { origin, .. } => assert!(origin.ends_with("broken.conf")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

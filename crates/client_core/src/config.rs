use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "portal.toml";
pub const DEFAULT_API_BASE_URL: &str = "https://zalexinc.azure-api.net";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            api_key: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    api_key: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid settings file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid api base url '{url}': {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("api base url '{0}' must use http or https")]
    UnsupportedScheme(String),
}

impl Settings {
    /// Apply command-line overrides on top of loaded settings.
    pub fn with_overrides(
        mut self,
        api_base_url: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        if let Some(key) = api_key {
            self.api_key = key;
        }
        validate_base_url(&self.api_base_url)?;
        Ok(self)
    }
}

/// Defaults, then the TOML file, then environment variables.
///
/// With `path == None` the default `portal.toml` is read if it exists. An
/// explicitly named file must exist.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    load_settings_with(path, |name| std::env::var(name).ok())
}

pub fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let file_cfg = match path {
        Some(path) => Some(read_file_settings(path)?),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                Some(read_file_settings(default_path)?)
            } else {
                None
            }
        }
    };

    if let Some(file_cfg) = file_cfg {
        if let Some(v) = file_cfg.api_base_url {
            settings.api_base_url = v;
        }
        if let Some(v) = file_cfg.api_key {
            settings.api_key = v;
        }
        match file_cfg.request_timeout_secs {
            Some(0) => warn!("ignoring request_timeout_secs = 0 in settings file"),
            Some(v) => settings.request_timeout_secs = v,
            None => {}
        }
    }

    let read = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    if let Some(v) = read("PORTAL_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = read("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = read("PORTAL_API_KEY") {
        settings.api_key = v;
    }
    if let Some(v) = read("APP__API_KEY") {
        settings.api_key = v;
    }

    if let Some(v) = read("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout_secs = parsed,
            _ => warn!("ignoring invalid APP__REQUEST_TIMEOUT_SECS value '{v}'"),
        }
    }

    validate_base_url(&settings.api_base_url)?;
    Ok(settings)
}

fn read_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(raw.trim()).map_err(|source| ConfigError::BaseUrl {
        url: raw.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        sync::atomic::{AtomicUsize, Ordering},
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    fn temp_settings_file(contents: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let seq = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
        let dir = env::temp_dir().join(format!("cert_portal_config_test_{suffix}_{seq}"));
        fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("portal.toml");
        fs::write(&path, contents).expect("write settings");
        path
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_settings_file(
            "api_base_url = \"http://127.0.0.1:9000\"\napi_key = \"file-key\"\nrequest_timeout_secs = 3\n",
        );
        let settings = load_settings_with(Some(&path), env_from(&[])).expect("load");
        assert_eq!(settings.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(settings.api_key, "file-key");
        assert_eq!(settings.request_timeout_secs, 3);
        fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn zero_timeout_in_file_keeps_default() {
        let path = temp_settings_file("request_timeout_secs = 0\n");
        let settings = load_settings_with(Some(&path), env_from(&[])).expect("load");
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn env_overrides_file_and_app_prefix_wins() {
        let path = temp_settings_file("api_key = \"file-key\"\n");
        let settings = load_settings_with(
            Some(&path),
            env_from(&[
                ("PORTAL_API_KEY", "portal-key"),
                ("APP__API_KEY", "app-key"),
                ("PORTAL_API_BASE_URL", "https://example.test"),
                ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
            ]),
        )
        .expect("load");
        assert_eq!(settings.api_key, "app-key");
        assert_eq!(settings.api_base_url, "https://example.test");
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let path = temp_settings_file("api_key = \"file-key\"\n");
        let settings =
            load_settings_with(Some(&path), env_from(&[("PORTAL_API_KEY", "  ")])).expect("load");
        assert_eq!(settings.api_key, "file-key");
        fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let missing = env::temp_dir().join("cert_portal_definitely_missing.toml");
        let err = load_settings_with(Some(&missing), env_from(&[])).expect_err("must fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_reported() {
        let path = temp_settings_file("api_key = [\n");
        let err = load_settings_with(Some(&path), env_from(&[])).expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
        fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
    }

    #[test]
    fn rejects_non_http_base_urls() {
        let err = Settings::default()
            .with_overrides(Some("ftp://files.test".into()), None)
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::UnsupportedScheme(_)));

        let err = Settings::default()
            .with_overrides(Some("not a url".into()), None)
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::BaseUrl { .. }));
    }

    #[test]
    fn overrides_replace_loaded_values() {
        let settings = Settings::default()
            .with_overrides(Some("http://localhost:8080".into()), Some("cli-key".into()))
            .expect("overrides");
        assert_eq!(settings.api_base_url, "http://localhost:8080");
        assert_eq!(settings.api_key, "cli-key");
    }
}

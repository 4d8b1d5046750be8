use std::{collections::HashMap, fs, path::Path};

use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8001/api/products";
const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("api url is empty")]
    EmptyApiUrl,
    #[error("api url '{url}' is invalid: {source}")]
    InvalidApiUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("api url '{0}' must use http or https")]
    UnsupportedScheme(String),
}

/// Defaults, then `dashboard.toml` in the working directory, then
/// environment variables. The CLI flag is applied by the caller.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(SETTINGS_FILE));
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<HashMap<String, String>>(&raw) {
        Ok(file_cfg) => {
            if let Some(v) = file_cfg.get("api_url") {
                settings.api_url = v.clone();
            }
            if let Some(v) = file_cfg.get("log_filter") {
                settings.log_filter = v.clone();
            }
        }
        Err(err) => {
            // Logging is not up yet; the settings decide its filter.
            eprintln!("ignoring {}: {err}", path.display());
        }
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("PRODUCT_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

/// Trims whitespace and trailing slashes and checks the url is http(s).
pub fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyApiUrl);
    }

    let parsed = Url::parse(trimmed).map_err(|source| ConfigError::InvalidApiUrl {
        url: trimmed.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn normalizes_trailing_slashes_and_whitespace() {
        assert_eq!(
            normalize_api_url("  http://localhost:8001/api/products//  ").expect("url"),
            "http://localhost:8001/api/products"
        );
    }

    #[test]
    fn rejects_empty_relative_and_non_http_urls() {
        assert!(matches!(normalize_api_url("  "), Err(ConfigError::EmptyApiUrl)));
        assert!(matches!(
            normalize_api_url("/api/products"),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
        assert!(matches!(
            normalize_api_url("ftp://host/products"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn later_env_names_override_earlier_ones() {
        let mut settings = Settings::default();
        apply_env(&mut settings, |key| match key {
            "PRODUCT_API_URL" => Some("http://first/api/products".into()),
            "APP__API_URL" => Some("http://second/api/products".into()),
            "APP__LOG_FILTER" => Some("debug".into()),
            _ => None,
        });
        assert_eq!(settings.api_url, "http://second/api/products");
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn file_values_replace_defaults_and_missing_file_is_ignored() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("dashboard_settings_test_{suffix}.toml"));

        let mut settings = Settings::default();
        apply_file(&mut settings, &path);
        assert_eq!(settings, Settings::default());

        fs::write(&path, "api_url = \"http://api:8001/api/products\"\n").expect("write");
        apply_file(&mut settings, &path);
        assert_eq!(settings.api_url, "http://api:8001/api/products");
        assert_eq!(settings.log_filter, "info");

        fs::remove_file(path).expect("cleanup");
    }
}

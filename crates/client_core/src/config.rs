use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const SETTINGS_FILE: &str = "listings.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub analytics_measurement_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            analytics_measurement_id: None,
        }
    }
}

impl Settings {
    pub fn api_base_url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.api_base_url)
            .with_context(|| format!("invalid api base url '{}'", self.api_base_url))
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// File values override defaults; environment values override the file.
pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("analytics_measurement_id") {
                settings.analytics_measurement_id = Some(v.clone());
            }
        }
    }

    if let Some(v) = env("LISTINGS_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("ANALYTICS_MEASUREMENT_ID") {
        settings.analytics_measurement_id = Some(v);
    }
    if let Some(v) = env("APP__ANALYTICS_MEASUREMENT_ID") {
        settings.analytics_measurement_id = Some(v);
    }

    settings.api_base_url = normalize_api_base_url(&settings.api_base_url);
    settings.analytics_measurement_id = settings
        .analytics_measurement_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    settings
}

pub fn normalize_api_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_API_BASE_URL.to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

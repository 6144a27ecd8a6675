use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::error::FetchError;
use url::Url;

pub const DEFAULT_ENDPOINT_URL: &str = "https://fakestoreapi.com/products";
pub const DEFAULT_SETTINGS_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub endpoint_url: String,
    pub fetch_on_start: bool,
    pub event_buffer: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.into(),
            fetch_on_start: true,
            event_buffer: 256,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    endpoint_url: Option<String>,
    fetch_on_start: Option<bool>,
    event_buffer: Option<usize>,
}

/// Defaults, then `catalog.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<CatalogSettings> {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<CatalogSettings> {
    let mut settings = CatalogSettings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        if let Some(v) = file_cfg.endpoint_url {
            settings.endpoint_url = v;
        }
        if let Some(v) = file_cfg.fetch_on_start {
            settings.fetch_on_start = v;
        }
        if let Some(v) = file_cfg.event_buffer {
            settings.event_buffer = v;
        }
    }

    if let Some(v) = env("CATALOG_ENDPOINT_URL") {
        settings.endpoint_url = v;
    }
    if let Some(v) = env("APP__CATALOG_ENDPOINT_URL") {
        settings.endpoint_url = v;
    }

    if let Some(v) = env("APP__FETCH_ON_START") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => settings.fetch_on_start = true,
            "0" | "false" | "no" => settings.fetch_on_start = false,
            other => tracing::warn!(value = other, "ignoring unrecognized APP__FETCH_ON_START"),
        }
    }

    if let Some(v) = env("APP__EVENT_BUFFER") {
        match v.parse::<usize>() {
            Ok(parsed) if parsed > 0 => settings.event_buffer = parsed,
            _ => tracing::warn!(value = %v, "ignoring invalid APP__EVENT_BUFFER"),
        }
    }

    settings.event_buffer = settings.event_buffer.max(1);
    Ok(settings)
}

/// Validates the endpoint string. A malformed endpoint is reported as a fetch
/// failure rather than a startup error.
pub fn parse_endpoint(raw: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

use crate::infrastructure::error::InfraError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

const APP_JSON: &str = "app.json";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/";
const DEFAULT_MOTIVATION_REFRESH_SECONDS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 15;

const ENV_API_BASE_URL: &str = "STUDYPLAN_API_BASE_URL";
const ENV_SESSION_COOKIE: &str = "STUDYPLAN_SESSION_COOKIE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct AppConfigFile {
    schema: u8,
    api_base_url: Option<String>,
    motivation_refresh_seconds: Option<u64>,
    request_timeout_seconds: Option<u64>,
}

/// Effective dashboard settings after defaults and environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub api_base_url: Url,
    pub session_cookie: Option<String>,
    pub motivation_refresh: Duration,
    pub request_timeout: Duration,
}

fn default_app_config() -> serde_json::Value {
    serde_json::json!({
        "schema": 1,
        "apiBaseUrl": DEFAULT_API_BASE_URL,
        "motivationRefreshSeconds": DEFAULT_MOTIVATION_REFRESH_SECONDS,
        "requestTimeoutSeconds": DEFAULT_REQUEST_TIMEOUT_SECONDS
    })
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    let path = config_dir.join(APP_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&default_app_config())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_dashboard_config(config_dir: &Path) -> Result<DashboardConfig, InfraError> {
    load_dashboard_config_from_lookup(config_dir, |key| std::env::var(key).ok())
}

pub fn load_dashboard_config_from_lookup<F>(
    config_dir: &Path,
    lookup: F,
) -> Result<DashboardConfig, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = config_dir.join(APP_JSON);
    let app: AppConfigFile = serde_json::from_value(read_config(&path)?).map_err(|error| {
        InfraError::InvalidConfig(format!("invalid {}: {error}", path.display()))
    })?;

    let raw_base_url = lookup_value(&lookup, ENV_API_BASE_URL)
        .or(app.api_base_url)
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let api_base_url = parse_base_url(&raw_base_url)?;

    let refresh_seconds = app
        .motivation_refresh_seconds
        .unwrap_or(DEFAULT_MOTIVATION_REFRESH_SECONDS);
    if refresh_seconds == 0 {
        return Err(InfraError::InvalidConfig(
            "motivationRefreshSeconds must be > 0".to_string(),
        ));
    }
    let timeout_seconds = app
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);
    if timeout_seconds == 0 {
        return Err(InfraError::InvalidConfig(
            "requestTimeoutSeconds must be > 0".to_string(),
        ));
    }

    Ok(DashboardConfig {
        api_base_url,
        session_cookie: lookup_value(&lookup, ENV_SESSION_COOKIE),
        motivation_refresh: Duration::from_secs(refresh_seconds),
        request_timeout: Duration::from_secs(timeout_seconds),
    })
}

fn lookup_value<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses the API root, forcing a trailing slash so relative joins keep the path prefix.
pub fn parse_base_url(raw: &str) -> Result<Url, InfraError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|error| InfraError::InvalidConfig(format!("invalid apiBaseUrl '{trimmed}': {error}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(InfraError::InvalidConfig(format!(
            "apiBaseUrl must be an http(s) URL, got '{trimmed}'"
        )));
    }
    Ok(url)
}

use crate::infrastructure::error::InfraError;
use std::fs;
use std::path::Path;
use std::time::Duration;

const APP_JSON: &str = "app.json";
const DEFAULT_APP_NAME: &str = "Dayboard";
const DEFAULT_DATABASE_FILE: &str = "dayboard.sqlite";
const DEFAULT_LOG_FILTER: &str = "dayboard=info";
const DEFAULT_ROLLOVER_POLL_MS: u64 = 60_000;
const DEFAULT_FOREGROUND_THRESHOLD_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_name: String,
    pub database_file: String,
    pub log_filter: String,
    pub rollover_poll: Duration,
    pub foreground_threshold: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            rollover_poll: Duration::from_millis(DEFAULT_ROLLOVER_POLL_MS),
            foreground_threshold: Duration::from_millis(DEFAULT_FOREGROUND_THRESHOLD_MS),
        }
    }
}

fn default_app_json() -> serde_json::Value {
    serde_json::json!({
        "schema": 1,
        "appName": DEFAULT_APP_NAME,
        "databaseFile": DEFAULT_DATABASE_FILE,
        "rolloverPollMs": DEFAULT_ROLLOVER_POLL_MS,
        "foregroundThresholdMs": DEFAULT_FOREGROUND_THRESHOLD_MS,
        "logFilter": DEFAULT_LOG_FILTER
    })
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    let path = config_dir.join(APP_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&default_app_json())?;
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

fn non_empty_str<'a>(value: &'a serde_json::Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn millis(value: &serde_json::Value, field: &str, default_ms: u64) -> Duration {
    let raw = value
        .get(field)
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(default_ms);
    Duration::from_millis(raw.max(1))
}

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig, InfraError> {
    let app = read_config(&config_dir.join(APP_JSON))?;
    Ok(AppConfig {
        app_name: non_empty_str(&app, "appName")
            .unwrap_or(DEFAULT_APP_NAME)
            .to_string(),
        database_file: non_empty_str(&app, "databaseFile")
            .unwrap_or(DEFAULT_DATABASE_FILE)
            .to_string(),
        log_filter: non_empty_str(&app, "logFilter")
            .unwrap_or(DEFAULT_LOG_FILTER)
            .to_string(),
        rollover_poll: millis(&app, "rolloverPollMs", DEFAULT_ROLLOVER_POLL_MS),
        foreground_threshold: millis(
            &app,
            "foregroundThresholdMs",
            DEFAULT_FOREGROUND_THRESHOLD_MS,
        ),
    })
}

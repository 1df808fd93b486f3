//! Configuration loader
//!
//! Loads application configuration from a file, then layers environment
//! overrides on top.
//!
//! ## Loading Strategy
//! 1. Use the explicit path if one is given, otherwise probe standard paths
//! 2. Parse as TOML or JSON depending on the file extension
//! 3. Apply `BUSYSYNC_*` environment overrides
//! 4. Validate the result
//!
//! ## Environment Variables
//! - `BUSYSYNC_CALENDAR_ID`: Target calendar id
//! - `BUSYSYNC_GOOGLE_ACCESS_TOKEN`: Static bearer token
//! - `BUSYSYNC_GOOGLE_CLIENT_ID`, `BUSYSYNC_GOOGLE_CLIENT_SECRET`,
//!   `BUSYSYNC_GOOGLE_REFRESH_TOKEN`: OAuth2 refresh-token credentials (all
//!   three together)
//! - `BUSYSYNC_TIMEZONE`: IANA zone of the reconciliation window
//! - `BUSYSYNC_DAYS`: Window length in days
//! - `BUSYSYNC_CRON`: Six-field cron expression of the scheduler
//! - `BUSYSYNC_LOG_LEVEL`: `trace` to `error`
//! - `BUSYSYNC_LOG_FORMAT`: `text` or `json`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./busysync.toml`, `./busysync.json` (current working directory)
//! 2. `./config.toml`, `./config.json` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use busysync_domain::{AppConfig, CalendarCredentials, LogFormat, Result, SyncError};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["busysync.toml", "busysync.json", "config.toml", "config.json"];

/// Load, override and validate configuration.
///
/// # Errors
/// Returns `SyncError::Config` if no file is found, the file cannot be
/// parsed, an override is malformed, or validation fails.
pub fn load(path: Option<PathBuf>) -> Result<AppConfig> {
    let mut config = load_from_file(path)?;
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// The file [`load`] will read: `path` when given, otherwise the first hit
/// of [`probe_config_paths`].
///
/// Runs before the log subscriber exists, so callers log the result
/// themselves once logging is up.
///
/// # Errors
/// Returns `SyncError::Config` if the explicit path does not exist or no
/// standard location holds a config file.
pub fn resolve_config_path(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) if p.exists() => Ok(p),
        Some(p) => Err(SyncError::Config(format!("Config file not found: {}", p.display()))),
        None => probe_config_paths().ok_or_else(|| {
            SyncError::Config("No config file found in any of the standard locations".to_string())
        }),
    }
}

/// Load configuration from a file without overrides or validation.
///
/// If `path` is `None`, probes the standard locations (see
/// [`probe_config_paths`]).
///
/// # Errors
/// Returns `SyncError::Config` if the file cannot be found or read, or its
/// format is invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(path)?;

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration, choosing the format by extension (`.toml` or `.json`).
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Apply `BUSYSYNC_*` overrides to a loaded configuration.
///
/// # Errors
/// Returns `SyncError::Config` for unparsable numbers, an unknown log
/// format, or a partial set of refresh-token variables.
pub fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Some(calendar_id) = env_var("BUSYSYNC_CALENDAR_ID") {
        config.calendar.calendar_id = calendar_id;
    }

    let client_id = env_var("BUSYSYNC_GOOGLE_CLIENT_ID");
    let client_secret = env_var("BUSYSYNC_GOOGLE_CLIENT_SECRET");
    let refresh_token = env_var("BUSYSYNC_GOOGLE_REFRESH_TOKEN");
    match (client_id, client_secret, refresh_token) {
        (Some(client_id), Some(client_secret), Some(refresh_token)) => {
            let token_url = match &config.calendar.credentials {
                Some(CalendarCredentials::RefreshToken { token_url, .. }) => token_url.clone(),
                _ => busysync_domain::constants::GOOGLE_OAUTH_TOKEN_URL.to_string(),
            };
            config.calendar.credentials = Some(CalendarCredentials::RefreshToken {
                client_id,
                client_secret,
                refresh_token,
                token_url,
            });
        }
        (None, None, None) => {
            if let Some(token) = env_var("BUSYSYNC_GOOGLE_ACCESS_TOKEN") {
                config.calendar.credentials = Some(CalendarCredentials::AccessToken { token });
            }
        }
        _ => {
            return Err(SyncError::Config(
                "BUSYSYNC_GOOGLE_CLIENT_ID, BUSYSYNC_GOOGLE_CLIENT_SECRET and \
                 BUSYSYNC_GOOGLE_REFRESH_TOKEN must be set together"
                    .to_string(),
            ));
        }
    }

    if let Some(timezone) = env_var("BUSYSYNC_TIMEZONE") {
        config.reconcile.timezone = timezone;
    }
    if let Some(days) = env_var("BUSYSYNC_DAYS") {
        config.reconcile.days = days
            .parse::<u32>()
            .map_err(|e| SyncError::Config(format!("Invalid BUSYSYNC_DAYS: {e}")))?;
    }
    if let Some(cron) = env_var("BUSYSYNC_CRON") {
        config.scheduler.cron_expression = cron;
    }
    if let Some(level) = env_var("BUSYSYNC_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = env_var("BUSYSYNC_LOG_FORMAT") {
        config.logging.format = format.parse::<LogFormat>()?;
    }

    Ok(())
}

/// Non-empty environment variable, if set.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

//! Configuration management

use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COLLAPSE_DAYS, DEFAULT_CRON_EXPRESSION, DEFAULT_EVENT_DURATION_MINUTES,
    DEFAULT_JOB_TIMEOUT_SECS, DEFAULT_MAX_COLLAPSE_PASSES, DEFAULT_OWNERSHIP_MARKER,
    DEFAULT_RECONCILE_DAYS, DEFAULT_TIMEZONE, GOOGLE_CALENDAR_API_BASE, GOOGLE_OAUTH_TOKEN_URL,
};
use crate::errors::{Result, SyncError};
use crate::schedule::WeeklySchedule;
use crate::slot::SlotDuration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    pub calendar: CalendarConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.reconcile.timezone()?;
        if self.reconcile.days == 0 {
            return Err(SyncError::Config("reconcile.days must be at least 1".into()));
        }
        if self.reconcile.collapse_days == 0 {
            return Err(SyncError::Config("reconcile.collapse_days must be at least 1".into()));
        }
        if self.reconcile.event_duration_minutes == 0 {
            return Err(SyncError::Config(
                "reconcile.event_duration_minutes must be at least 1".into(),
            ));
        }
        if self.reconcile.max_collapse_passes == 0 {
            return Err(SyncError::Config(
                "reconcile.max_collapse_passes must be at least 1".into(),
            ));
        }
        if self.scheduler.cron_expression.trim().is_empty() {
            return Err(SyncError::Config("scheduler.cron_expression is empty".into()));
        }
        if self.calendar.calendar_id.trim().is_empty() {
            return Err(SyncError::Config("calendar.calendar_id is empty".into()));
        }
        if self.calendar.ownership_marker.trim().is_empty() {
            return Err(SyncError::Config("calendar.ownership_marker is empty".into()));
        }
        self.calendar.credentials()?;
        self.logging.level.parse::<LogLevel>()?;
        self.source.validate()
    }
}

/// Reconciliation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// IANA zone whose local midnight bounds the window.
    pub timezone: String,
    pub days: u32,
    pub event_duration_minutes: u32,
    pub collapse_days: u32,
    pub max_collapse_passes: u32,
}

impl ReconcileConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| SyncError::Config(format!("unknown time zone '{}': {e}", self.timezone)))
    }

    pub fn event_duration(&self) -> SlotDuration {
        SlotDuration::from_minutes(self.event_duration_minutes)
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            days: DEFAULT_RECONCILE_DAYS,
            event_duration_minutes: DEFAULT_EVENT_DURATION_MINUTES,
            collapse_days: DEFAULT_COLLAPSE_DAYS,
            max_collapse_passes: DEFAULT_MAX_COLLAPSE_PASSES,
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub cron_expression: String,
    pub job_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_CRON_EXPRESSION.to_string(),
            job_timeout_secs: DEFAULT_JOB_TIMEOUT_SECS,
        }
    }
}

/// Calendar backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub calendar_id: String,
    #[serde(default = "default_calendar_api_base")]
    pub api_base_url: String,
    #[serde(default = "default_ownership_marker")]
    pub ownership_marker: String,
    /// May be left out of the file and supplied through the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CalendarCredentials>,
}

impl CalendarConfig {
    pub fn credentials(&self) -> Result<&CalendarCredentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| SyncError::Config("calendar.credentials are missing".into()))
    }
}

fn default_calendar_api_base() -> String {
    GOOGLE_CALENDAR_API_BASE.to_string()
}

fn default_ownership_marker() -> String {
    DEFAULT_OWNERSHIP_MARKER.to_string()
}

/// How the calendar adapter authenticates.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalendarCredentials {
    /// A bearer token used as-is.
    AccessToken {
        #[serde(skip_serializing)]
        token: String,
    },
    /// An OAuth2 refresh token exchanged for access tokens on demand.
    RefreshToken {
        client_id: String,
        #[serde(skip_serializing)]
        client_secret: String,
        #[serde(skip_serializing)]
        refresh_token: String,
        #[serde(default = "default_token_url")]
        token_url: String,
    },
}

fn default_token_url() -> String {
    GOOGLE_OAUTH_TOKEN_URL.to_string()
}

impl fmt::Debug for CalendarCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessToken { .. } => {
                f.debug_struct("AccessToken").field("token", &"<redacted>").finish()
            }
            Self::RefreshToken { client_id, token_url, .. } => f
                .debug_struct("RefreshToken")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .field("refresh_token", &"<redacted>")
                .field("token_url", token_url)
                .finish(),
        }
    }
}

/// Which busy-slot provider feeds the desired state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// WordPress Amelia booking plugin; reports occupied slots.
    Amelia(AmeliaSourceConfig),
    /// Hospital appointments portal; reports free slots only.
    Portal(PortalSourceConfig),
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Amelia(amelia) => {
                require_url("source.base_url", &amelia.base_url)?;
                if amelia.provider_ids.is_empty() {
                    return Err(SyncError::Config("source.provider_ids is empty".into()));
                }
                Ok(())
            }
            Self::Portal(portal) => {
                require_url("source.base_url", &portal.base_url)?;
                if portal.doctor_code.trim().is_empty() {
                    return Err(SyncError::Config("source.doctor_code is empty".into()));
                }
                if portal.schedule.is_empty() {
                    return Err(SyncError::Config(
                        "source.schedule must list at least one day".into(),
                    ));
                }
                portal.schedule.validate()
            }
        }
    }
}

fn require_url(field: &str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(SyncError::Config(format!("{field} must be an http(s) URL, got '{value}'")))
    }
}

/// Amelia busy-slot source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmeliaSourceConfig {
    pub base_url: String,
    #[serde(default = "default_amelia_service_id")]
    pub service_id: u32,
    #[serde(default = "default_amelia_service_duration")]
    pub service_duration_secs: u32,
    pub provider_ids: Vec<u32>,
    #[serde(default = "default_months_load")]
    pub months_load: u32,
    /// Substring of the response `message` that marks success.
    #[serde(default = "default_success_marker")]
    pub success_marker: String,
}

fn default_amelia_service_id() -> u32 {
    13
}

fn default_amelia_service_duration() -> u32 {
    1800
}

fn default_months_load() -> u32 {
    1
}

fn default_success_marker() -> String {
    "Successfully".to_string()
}

/// Free-slot portal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSourceConfig {
    pub base_url: String,
    #[serde(default = "default_hospital_connection")]
    pub hospital_connection: String,
    pub specialty_id: u32,
    pub doctor_code: String,
    #[serde(default = "default_include_more_days")]
    pub include_more_days: bool,
    pub schedule: WeeklySchedule,
}

fn default_hospital_connection() -> String {
    "ConnectionHM".to_string()
}

fn default_include_more_days() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Text }
    }
}

/// Output format of the log subscriber.
///
/// Files and `BUSYSYNC_LOG_FORMAT` both go through [`FromStr`], so either
/// accepts any casing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(SyncError::Config(format!("invalid log format: {other}"))),
        }
    }
}

impl<'de> Deserialize<'de> for LogFormat {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Log verbosity accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(SyncError::Config(format!("invalid log level: {other}"))),
        }
    }
}

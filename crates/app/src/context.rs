//! Application context - dependency injection container

use std::sync::Arc;

use busysync_core::{
    BusySlotSource, CalendarMirror, DuplicateCollapser, Reconciler, ReconcilerSettings,
};
use busysync_domain::{AppConfig, ReconciliationWindow, Result, SourceConfig};
use busysync_infra::google::{access_token_provider, GoogleCalendarMirror};
use busysync_infra::observability::metrics::PassMetrics;
use busysync_infra::scheduling::{ReconcileScheduler, ReconcileSchedulerConfig};
use busysync_infra::{AmeliaBusySlotSource, HttpClient, PortalBusySlotSource};
use chrono::{DateTime, Utc};
use tracing::info;

/// Application context - holds the wired adapters and services
pub struct AppContext {
    pub config: AppConfig,
    pub mirror: Arc<dyn CalendarMirror>,
    pub source: Arc<dyn BusySlotSource>,
    pub reconciler: Arc<Reconciler>,
    pub metrics: Arc<PassMetrics>,
}

impl AppContext {
    /// Wire adapters for a validated configuration.
    ///
    /// # Errors
    /// Returns `SyncError::Config` if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::new()?;

        let tokens = access_token_provider(config.calendar.credentials()?, http.clone());
        let mirror: Arc<dyn CalendarMirror> = Arc::new(GoogleCalendarMirror::new(
            http.clone(),
            tokens,
            config.calendar.api_base_url.clone(),
            config.calendar.calendar_id.clone(),
            config.calendar.ownership_marker.clone(),
        ));

        let source: Arc<dyn BusySlotSource> = match &config.source {
            SourceConfig::Amelia(amelia) => {
                Arc::new(AmeliaBusySlotSource::new(http.clone(), amelia.clone()))
            }
            SourceConfig::Portal(portal) => {
                Arc::new(PortalBusySlotSource::new(http.clone(), portal.clone()))
            }
        };

        let settings = ReconcilerSettings {
            timezone: config.reconcile.timezone()?,
            days: config.reconcile.days,
            event_duration: config.reconcile.event_duration(),
        };
        let reconciler = Arc::new(Reconciler::new(source.clone(), mirror.clone(), settings));

        info!(
            calendar_id = %config.calendar.calendar_id,
            source = source_kind(&config.source),
            timezone = %settings.timezone,
            days = settings.days,
            "application context initialised"
        );

        Ok(Self { config, mirror, source, reconciler, metrics: Arc::new(PassMetrics::new()) })
    }

    pub fn collapser(&self) -> DuplicateCollapser {
        DuplicateCollapser::new(self.mirror.clone())
            .with_max_passes(self.config.reconcile.max_collapse_passes)
    }

    /// Collapse window of `days` (default `reconcile.collapse_days`) starting today.
    pub fn collapse_window(
        &self,
        now: DateTime<Utc>,
        days: Option<u32>,
    ) -> Result<ReconciliationWindow> {
        ReconciliationWindow::starting_at(
            now,
            self.reconciler.settings().timezone,
            days.unwrap_or(self.config.reconcile.collapse_days),
        )
    }

    pub fn scheduler(&self) -> ReconcileScheduler {
        ReconcileScheduler::with_config(
            ReconcileSchedulerConfig::from(&self.config.scheduler),
            self.reconciler.clone(),
            self.metrics.clone(),
        )
    }
}

fn source_kind(source: &SourceConfig) -> &'static str {
    match source {
        SourceConfig::Amelia(_) => "amelia",
        SourceConfig::Portal(_) => "portal",
    }
}

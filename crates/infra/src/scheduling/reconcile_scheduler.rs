//! Cron-driven reconciliation scheduler.
//!
//! Triggers a [`ReconcileJob`] on a cron schedule. A single-permit semaphore
//! gates the job: a tick that fires while the previous pass still holds the
//! permit is skipped, never queued. Stopping the scheduler waits for the
//! in-flight pass to release the permit.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use busysync_core::Reconciler;
//! use busysync_infra::observability::metrics::PassMetrics;
//! use busysync_infra::scheduling::{ReconcileScheduler, ReconcileSchedulerConfig, SchedulerResult};
//!
//! # async fn example(reconciler: Arc<Reconciler>) -> SchedulerResult<()> {
//! let metrics = Arc::new(PassMetrics::new());
//! let mut scheduler = ReconcileScheduler::with_config(
//!     ReconcileSchedulerConfig {
//!         cron_expression: "0 * * * * *".into(), // every minute
//!         ..Default::default()
//!     },
//!     reconciler,
//!     metrics,
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use busysync_core::{PassReport, Reconciler};
use busysync_domain::constants::{DEFAULT_CRON_EXPRESSION, DEFAULT_JOB_TIMEOUT_SECS};
use busysync_domain::{SchedulerConfig, SyncError};
use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::observability::metrics::PassMetrics;
use crate::observability::MetricsResult;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// One reconciliation pass, as run by the scheduler.
#[async_trait]
pub trait ReconcileJob: Send + Sync {
    async fn run(&self) -> Result<PassReport, SyncError>;
}

#[async_trait]
impl ReconcileJob for Reconciler {
    async fn run(&self) -> Result<PassReport, SyncError> {
        self.run_pass(Utc::now()).await
    }
}

/// Configuration for the reconcile scheduler.
#[derive(Debug, Clone)]
pub struct ReconcileSchedulerConfig {
    /// Six-field cron expression describing the execution schedule.
    pub cron_expression: String,
    /// Timeout applied to a single pass.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for ReconcileSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_CRON_EXPRESSION.into(),
            job_timeout: Duration::from_secs(DEFAULT_JOB_TIMEOUT_SECS),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&SchedulerConfig> for ReconcileSchedulerConfig {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            cron_expression: config.cron_expression.clone(),
            job_timeout: Duration::from_secs(config.job_timeout_secs),
            ..Default::default()
        }
    }
}

/// Reconciliation scheduler with explicit lifecycle management.
pub struct ReconcileScheduler {
    scheduler: Option<JobScheduler>,
    config: ReconcileSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    gate: Arc<Semaphore>,
    metrics: Arc<PassMetrics>,
    job: Arc<dyn ReconcileJob>,
}

impl ReconcileScheduler {
    /// Create a stopped scheduler; call [`start`](Self::start) to begin ticking.
    pub fn with_config(
        config: ReconcileSchedulerConfig,
        job: Arc<dyn ReconcileJob>,
        metrics: Arc<PassMetrics>,
    ) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            gate: Arc::new(Semaphore::new(1)),
            metrics,
            job,
        }
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        let start_result = tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?;

        start_result.map_err(|source| SchedulerError::StartFailed { source })?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel).await;
        });

        self.monitor_handle = Some(handle);
        info!("Reconcile scheduler started");
        Ok(())
    }

    /// Stop the scheduler, then wait for the in-flight pass to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let mut scheduler = match self.scheduler.take() {
            Some(scheduler) => scheduler,
            None => return Err(SchedulerError::NotRunning),
        };

        let stop_timeout = self.config.stop_timeout;
        let stop_result =
            tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
                .await
                .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?;

        stop_result.map_err(|source| SchedulerError::StopFailed { source })?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??
        }

        // A pass never outlives its job timeout, so waiting that long for the
        // permit is enough.
        let drain_timeout = self.config.job_timeout + self.config.join_timeout;
        let permit = tokio::time::timeout(drain_timeout, self.gate.acquire())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: drain_timeout, source })?
            .map_err(|_| SchedulerError::GateClosed)?;
        drop(permit);

        info!("Reconcile scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed { source })?;
        let cron_expr = self.config.cron_expression.clone();
        let metrics = self.metrics.clone();
        let job = self.job.clone();
        let gate = self.gate.clone();
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_async(cron_expr.as_str(), move |_id, _lock| {
            let metrics = metrics.clone();
            let job = job.clone();
            let gate = gate.clone();

            Box::pin(async move {
                let Ok(_permit) = gate.try_acquire_owned() else {
                    log_metric(metrics.record_tick_skipped(), "scheduler.reconcile.tick_skipped");
                    debug!("Previous pass still running; skipping tick");
                    return;
                };

                log_metric(metrics.record_pass_started(), "scheduler.reconcile.pass_started");
                let started = Instant::now();

                match tokio::time::timeout(job_timeout, job.run()).await {
                    Ok(Ok(report)) => {
                        log_metric(
                            metrics.record_pass_succeeded(
                                report.created,
                                report.deleted,
                                started.elapsed(),
                            ),
                            "scheduler.reconcile.pass_succeeded",
                        );
                        debug!(created = report.created, deleted = report.deleted, "Pass finished");
                    }
                    Ok(Err(err)) => {
                        log_metric(
                            metrics.record_pass_failed(started.elapsed()),
                            "scheduler.reconcile.pass_failed",
                        );
                        error!(error = %err, kind = err.label(), "Reconciliation pass failed");
                    }
                    Err(elapsed) => {
                        log_metric(
                            metrics.record_pass_timeout(),
                            "scheduler.reconcile.pass_timeout",
                        );
                        warn!(
                            timeout_secs = job_timeout.as_secs(),
                            "Reconciliation pass timed out"
                        );
                        debug!(elapsed = ?elapsed, "Timeout details");
                    }
                }
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered reconcile job");
        Ok(scheduler)
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("Reconcile scheduler monitor cancelled");
    }
}

fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        warn!(metric = metric, error = ?err, "Failed to record scheduler metric");
    }
}

impl Drop for ReconcileScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ReconcileScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}

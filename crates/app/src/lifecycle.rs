//! Command implementations and daemon lifecycle

use std::path::Path;

use anyhow::{Context, Result};
use busysync_core::{CollapseSummary, PassReport, ReconcilePlan};
use busysync_infra::InstanceLock;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cli::Command;
use crate::context::AppContext;

/// Take the calendar's instance lock when `command` writes to the calendar.
///
/// The daemon and the one-shot `once`/`collapse` commands share one lock per
/// calendar id, so at most one of them mutates the calendar at a time. `plan`
/// is read-only and runs unlocked.
pub fn lock_for(
    ctx: &AppContext,
    command: Command,
    lock_dir: &Path,
) -> Result<Option<InstanceLock>> {
    if !command.mutates_calendar() {
        return Ok(None);
    }
    let lock = InstanceLock::acquire(lock_dir, &ctx.config.calendar.calendar_id)
        .context("failed to take the busysync instance lock")?;
    Ok(Some(lock))
}

/// Collapse duplicates, then reconcile on the cron schedule until SIGINT or
/// SIGTERM. Shutdown waits for the in-flight pass.
///
/// The caller holds the instance lock (see [`lock_for`]).
pub async fn run_daemon(ctx: &AppContext) -> Result<()> {
    let summary = collapse(ctx, Utc::now(), None)
        .await
        .context("failed cleaning up duplicate calendar events on startup")?;
    info!(
        passes = summary.passes,
        deleted = summary.deleted,
        "startup duplicate collapse finished"
    );

    let mut scheduler = ctx.scheduler();
    scheduler.start().await.context("failed to start reconcile scheduler")?;
    info!(cron = %ctx.config.scheduler.cron_expression, "busysync started");

    shutdown_signal().await;
    info!("shutdown triggered, waiting for the in-flight pass");

    scheduler.stop().await.context("failed to stop reconcile scheduler")?;
    let metrics = ctx.metrics.snapshot();
    info!(
        passes_started = metrics.passes_started,
        passes_succeeded = metrics.passes_succeeded,
        passes_failed = metrics.passes_failed,
        ticks_skipped = metrics.ticks_skipped,
        "busysync stopped"
    );
    Ok(())
}

/// One reconciliation pass over the window containing `now`.
pub async fn run_once(ctx: &AppContext, now: DateTime<Utc>) -> Result<PassReport> {
    let report = ctx.reconciler.run_pass(now).await.context("reconciliation pass failed")?;
    Ok(report)
}

/// Run the collapse loop over `days` (or the configured collapse window).
pub async fn collapse(
    ctx: &AppContext,
    now: DateTime<Utc>,
    days: Option<u32>,
) -> Result<CollapseSummary> {
    let window = ctx.collapse_window(now, days)?;
    let summary = ctx.collapser().collapse_until_clean(&window).await?;
    Ok(summary)
}

/// Diff the next pass would apply, without touching the calendar.
pub async fn plan(ctx: &AppContext, now: DateTime<Utc>) -> Result<ReconcilePlan> {
    let window = ctx.reconciler.window_for(now)?;
    let plan = ctx.reconciler.plan_pass(&window).await?;
    Ok(plan)
}

/// Human-readable rendering of a plan, one line per mutation.
pub fn render_plan(plan: &ReconcilePlan) -> String {
    let mut out = String::new();
    for slot in &plan.to_create {
        out.push_str(&format!("create {slot}\n"));
    }
    for (slot, id) in &plan.to_delete {
        out.push_str(&format!("delete {slot} ({id})\n"));
    }
    out.push_str(&format!(
        "{} to create, {} to delete, {} unchanged\n",
        plan.to_create.len(),
        plan.to_delete.len(),
        plan.unchanged
    ));
    out
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            warn!(error = %err, "cannot listen for SIGTERM; waiting for Ctrl-C only");
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        () = wait_for_ctrl_c() => {}
        _ = terminate.recv() => info!("received SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl-C"),
        Err(err) => {
            warn!(error = %err, "cannot listen for Ctrl-C; running until terminated");
            std::future::pending::<()>().await;
        }
    }
}

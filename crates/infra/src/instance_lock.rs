//! Single-instance lock using PID files
//!
//! Two daemons reconciling the same calendar race each other's creates and
//! produce duplicates. The lock file name is derived from the calendar id, so
//! daemons for different calendars can share a lock directory.

use std::fs;
use std::path::{Path, PathBuf};

use busysync_domain::{Result, SyncError};

/// Single-instance lock manager
#[derive(Debug)]
pub struct InstanceLock {
    pid_file: PathBuf,
}

impl InstanceLock {
    /// Take the lock for `calendar_id` inside `lock_dir`.
    ///
    /// Returns an error if a live process already holds it. A PID file left
    /// behind by a dead process is replaced.
    pub fn acquire<P: AsRef<Path>>(lock_dir: P, calendar_id: &str) -> Result<Self> {
        let pid_file = lock_dir.as_ref().join(lock_file_name(calendar_id));

        if pid_file.exists() {
            if let Ok(content) = fs::read_to_string(&pid_file) {
                if let Ok(pid) = content.trim().parse::<u32>() {
                    if pid != std::process::id() && is_process_running(pid) {
                        tracing::warn!(existing_pid = pid, "instance_lock.process_active");
                        return Err(SyncError::Internal(format!(
                            "another busysync instance is already running for this calendar \
                             (PID: {pid})"
                        )));
                    }
                    tracing::warn!(stale_pid = pid, "instance_lock.stale_pid_file_detected");
                }
            }
            if let Err(err) = fs::remove_file(&pid_file) {
                tracing::warn!(
                    error = %err,
                    path = %pid_file.display(),
                    "instance_lock.remove_stale_pid_failed"
                );
            }
        }

        let current_pid = std::process::id();
        fs::write(&pid_file, current_pid.to_string())
            .map_err(|e| SyncError::Internal(format!("failed to create PID file: {e}")))?;

        tracing::info!(pid = current_pid, path = %pid_file.display(), "instance_lock.acquired");

        Ok(Self { pid_file })
    }

    pub fn path(&self) -> &Path {
        &self.pid_file
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.pid_file) {
            tracing::warn!(
                error = %e,
                path = %self.pid_file.display(),
                "instance_lock.remove_pid_failed"
            );
        } else {
            tracing::info!(path = %self.pid_file.display(), "instance_lock.released");
        }
    }
}

/// `busysync-<calendar>.pid` with every character outside `[A-Za-z0-9._-]`
/// replaced by `_`.
fn lock_file_name(calendar_id: &str) -> String {
    let sanitized: String = calendar_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    format!("busysync-{sanitized}.pid")
}

#[cfg(target_os = "linux")]
fn is_process_running(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn is_process_running(pid: u32) -> bool {
    use std::process::Command;

    // `kill -0` checks for existence without sending a signal
    Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_process_running(pid: u32) -> bool {
    tracing::warn!(pid = pid, "instance_lock.process_check_unsupported");
    false
}

//! Backend connectivity monitor
//!
//! Polls the backend health endpoint immediately and then on a fixed
//! interval, publishing a tri-state status. Purely informational: nothing
//! else waits on it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::WorkoutBackend;

/// Connectivity as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No health check has completed yet
    Checking,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn from_healthy(healthy: bool) -> Self {
        if healthy {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "Checking Backend",
            ConnectionStatus::Connected => "Backend Connected",
            ConnectionStatus::Disconnected => "Backend Offline",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "Verifying connection to processing server...",
            ConnectionStatus::Connected => "Ready to process workouts offline",
            ConnectionStatus::Disconnected => {
                "Video processing requires the backend server. Please start it by running: cd backend && ./start.sh"
            }
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionStatus::Checking => "checking",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        })
    }
}

/// Handle to a running health poller.
///
/// Dropping the handle stops the poller; no status update is published
/// after that.
pub struct HealthMonitor {
    status: watch::Receiver<ConnectionStatus>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl HealthMonitor {
    /// Start polling `backend` every `interval`, beginning right away
    pub fn spawn<B>(backend: Arc<B>, interval: Duration) -> Self
    where
        B: WorkoutBackend + ?Sized + 'static,
    {
        let (tx, status) = watch::channel(ConnectionStatus::Checking);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(backend, interval, tx, cancel.clone()));

        Self {
            status,
            cancel,
            task: Some(task),
        }
    }

    /// Latest published status
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Receiver notified on every status change
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Stop polling and wait for the poller to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "health poller exited abnormally");
            }
        }
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop<B>(
    backend: Arc<B>,
    interval: Duration,
    tx: watch::Sender<ConnectionStatus>,
    cancel: CancellationToken,
) where
    B: WorkoutBackend + ?Sized,
{
    info!(interval_secs = interval.as_secs(), "health monitor started");

    // First tick completes immediately
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // A check that outlives the interval counts as offline
        let healthy = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            checked = tokio::time::timeout(interval, backend.check_health()) => {
                checked.unwrap_or_else(|_| {
                    debug!("health check timed out");
                    false
                })
            }
        };
        let next = ConnectionStatus::from_healthy(healthy);

        let changed = tx.send_if_modified(|current| {
            if cancel.is_cancelled() || *current == next {
                return false;
            }
            *current = next;
            true
        });

        if changed {
            match next {
                ConnectionStatus::Disconnected => warn!("analysis backend is unreachable"),
                _ => info!(status = %next, "backend connectivity changed"),
            }
        } else {
            debug!(status = %next, "health check completed");
        }
    }

    debug!("health monitor stopped");
}

//! Recurring health-check task.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::controller::ControllerInner;

/// Period between recurring probes of the active environment.
pub const HEALTH_CHECK_PERIOD: Duration = Duration::from_secs(300);

/// Handle to the recurring health-check task.
///
/// Owned exclusively by the controller state; cancelled on dispose and
/// before any replacement task is started.
pub(crate) struct MonitorHandle {
    task: JoinHandle<()>,
    shutdown: broadcast::Sender<()>,
}

impl MonitorHandle {
    pub(crate) fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the task. Abort is deterministic: no probe fires after this
    /// returns, even if a tick was mid-flight at an await point.
    pub(crate) fn cancel(&self) {
        let _ = self.shutdown.send(());
        self.task.abort();
    }
}

/// Spawn the recurring monitor for `inner`'s active environment.
///
/// The task holds only a weak back-reference and ends itself once the
/// controller is dropped. Probe outcomes are fire-and-forget; they are
/// observable via logging and subsequent stats/check calls only.
pub(crate) fn spawn_monitor(inner: Weak<ControllerInner>, period: Duration) -> MonitorHandle {
    let (shutdown, mut signal) = broadcast::channel(1);

    let task = tokio::spawn(async move {
        let mut ticker = time::interval(period);
        // The first tick fires immediately; initialize already ran the
        // startup probe, so consume it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(inner) = inner.upgrade() else {
                        tracing::debug!("Controller dropped; health monitor exiting");
                        break;
                    };
                    inner.probe_active().await;
                }
                _ = signal.recv() => {
                    tracing::debug!("Health monitor received shutdown signal");
                    break;
                }
            }
        }
    });

    MonitorHandle { task, shutdown }
}

//! Static pull reconnect tasks
//!
//! A reconnect task is shared between the static relay registry and the
//! scheduled job driving it. Cancelling clears the task's data; the job
//! notices on its next tick and exits. A job is never force-aborted while
//! it may be mid-attempt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::registry::AppIdentity;
use crate::server::ControlConfig;

use super::target::RelayTarget;

/// Data a reconnect attempt needs
#[derive(Debug, Clone)]
pub struct StaticPull {
    pub target: Arc<RelayTarget>,
    /// Server and application the pull was started under
    pub identity: AppIdentity,
}

/// Shared state of one scheduled static pull
#[derive(Debug)]
pub struct ReconnectTask {
    data: Mutex<Option<StaticPull>>,
    attempts: AtomicU64,
}

impl ReconnectTask {
    pub fn new(pull: StaticPull) -> Arc<Self> {
        Arc::new(Self {
            data: Mutex::new(Some(pull)),
            attempts: AtomicU64::new(0),
        })
    }

    /// Snapshot of the pull, or None once cancelled
    pub fn pull(&self) -> Option<StaticPull> {
        self.data.lock().clone()
    }

    /// Clear the task's data. Returns false if it was already cancelled.
    pub fn cancel(&self) -> bool {
        self.data.lock().take().is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.data.lock().is_none()
    }

    /// Record an attempt, returning the pull to attempt if still active
    pub fn begin_attempt(&self) -> Option<StaticPull> {
        let pull = self.pull()?;
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Some(pull)
    }

    /// Number of attempts made so far
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

/// Runs reconnect tasks: first attempt immediately, then periodically
pub trait ReconnectScheduler {
    fn schedule(&self, task: Arc<ReconnectTask>);
}

/// Outbound side of the relay subsystem
pub trait RelayConnector: Send + Sync + 'static {
    /// Make sure a relay session exists for `pull`, starting one if needed
    fn reconnect(&self, pull: &StaticPull);
}

/// Scheduler spawning one tokio task per static pull
pub struct TokioReconnectScheduler {
    runtime: Handle,
    connector: Arc<dyn RelayConnector>,
    interval: Duration,
}

impl TokioReconnectScheduler {
    pub fn new(runtime: Handle, connector: Arc<dyn RelayConnector>, interval: Duration) -> Self {
        Self {
            runtime,
            connector,
            interval,
        }
    }

    /// Scheduler retrying every `config.reconnect_interval`
    pub fn from_config(
        runtime: Handle,
        connector: Arc<dyn RelayConnector>,
        config: &ControlConfig,
    ) -> Self {
        Self::new(runtime, connector, config.reconnect_interval)
    }

    /// Spawn the job for one task
    ///
    /// Returns a handle that can be awaited; the job ends after the task is
    /// cancelled.
    pub fn spawn(&self, task: Arc<ReconnectTask>) -> JoinHandle<()> {
        let connector = Arc::clone(&self.connector);
        let interval = self.interval;

        self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                let Some(pull) = task.begin_attempt() else {
                    tracing::debug!(attempts = task.attempts(), "Static pull cancelled, job done");
                    break;
                };

                tracing::debug!(
                    name = %pull.target.name,
                    url = %pull.target.url,
                    attempt = task.attempts(),
                    "Static pull reconnect"
                );
                connector.reconnect(&pull);
            }
        })
    }
}

impl ReconnectScheduler for TokioReconnectScheduler {
    fn schedule(&self, task: Arc<ReconnectTask>) {
        let _ = self.spawn(task);
    }
}

//! Background eviction of participants that stopped sending heartbeats.
//!
//! A sweep reads every participant, picks the ones whose last heartbeat is at
//! least `stale_after` old, and deletes them in one statement. Nothing holds
//! the rows between the read and the delete, so a heartbeat that lands in that
//! window can still lose to the eviction.
//!
//! Eviction is eventual: a participant idle for `stale_after` is removed by
//! the first sweep that runs after that point, not exactly when it expires.
//! Unlike joining, leaving posts no status message.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::{interval_at, Instant, MissedTickBehavior}};
use tokio_util::sync::CancellationToken;

use crate::{clock::Clock, directory::Directory, ChatResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperConfig {
    pub stale_after: Duration,
    pub every: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(10),
            every: Duration::from_secs(15),
        }
    }
}

pub struct Reaper {
    directory: Directory,
    clock: Arc<dyn Clock>,
    config: ReaperConfig,
}

impl Reaper {
    pub fn new(directory: Directory, clock: Arc<dyn Clock>, config: ReaperConfig) -> Self {
        Self { directory, clock, config }
    }

    /// One sweep. Returns the names that were evicted.
    pub async fn sweep(&self) -> ChatResult<Vec<String>> {
        let now = self.clock.now_ms();
        let stale_after = i64::try_from(self.config.stale_after.as_millis()).unwrap_or(i64::MAX);

        let (stale, names): (Vec<_>, Vec<_>) = self
            .directory
            .snapshot()
            .await?
            .into_iter()
            .filter(|p| now.saturating_sub(p.last_seen) >= stale_after)
            .map(|p| (p.id, p.name))
            .unzip();

        if stale.is_empty() {
            return Ok(names);
        }

        let removed = self.directory.evict(&stale).await?;
        tracing::info!(removed, names = ?names, "evicted inactive participants");
        Ok(names)
    }

    /// Starts sweeping in the background. The first sweep runs one period
    /// from now. Failures are logged and the schedule carries on.
    pub fn spawn(self) -> ReaperHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let every = self.config.every;
            let mut ticks = interval_at(Instant::now() + every, every);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticks.tick() => {}
                }

                match self.sweep().await {
                    Ok(evicted) => tracing::debug!(evicted = evicted.len(), "sweep finished"),
                    Err(err) => tracing::warn!(error = %err, "sweep failed, retrying next period"),
                }
            }

            tracing::debug!("reaper stopped");
        });

        ReaperHandle { cancel, task }
    }
}

/// Owns a running reaper. Dropping the handle leaves the task running;
/// call [`ReaperHandle::stop`] to end it.
pub struct ReaperHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Cancels the schedule and waits for an in-flight sweep to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            tracing::warn!(error = %err, "reaper task ended abnormally");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

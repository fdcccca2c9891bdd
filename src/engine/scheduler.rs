//! Tick scheduler.
//!
//! A single cancellable tokio task that calls a handler once per period for
//! one block. Starting a new block stops the previous task first, so at most
//! one tick task is ever alive.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use crate::types::BlockId;

/// What the tick handler wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// Owner of the periodic tick task.
#[derive(Debug)]
pub struct TickScheduler {
    period: Duration,
    task: Option<(BlockId, JoinHandle<()>)>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawns the tick task for `block`, replacing any previous one.
    ///
    /// The first call to `handler` happens one period after this call.
    pub fn start<F, Fut>(&mut self, block: BlockId, mut handler: F)
    where
        F: FnMut(BlockId) -> Fut + Send + 'static,
        Fut: Future<Output = TickFlow> + Send + 'static,
    {
        self.stop();

        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if handler(block).await == TickFlow::Stop {
                    break;
                }
            }
            tracing::debug!("Tick task for block {} finished", block);
        });

        tracing::debug!("Tick task for block {} spawned", block);
        self.task = Some((block, handle));
    }

    /// Aborts the tick task. Returns the block it was bound to.
    pub fn stop(&mut self) -> Option<BlockId> {
        let (block, handle) = self.task.take()?;
        handle.abort();
        tracing::debug!("Tick task for block {} stopped", block);
        Some(block)
    }

    /// The block being ticked, if the task is still alive.
    pub fn active(&self) -> Option<BlockId> {
        self.task
            .as_ref()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(block, _)| *block)
    }

    /// Waits until the tick task ends on its own.
    ///
    /// Returns immediately when no task is running. If this future is
    /// dropped early the task stays registered and `stop` can still abort it.
    pub async fn wait(&mut self) {
        if let Some((_, handle)) = self.task.as_mut() {
            let _ = handle.await;
            self.task = None;
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

//! Async glue around the dashboard engine.
//!
//! The service shares the engine behind `Arc<tokio::sync::Mutex<_>>` and
//! drives it from tokio tasks: the tick task of the running block, the
//! periodic autosave and the deferred next-block prompt.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::clock::Clock;
use crate::store::StateStore;
use crate::types::BlockId;

use super::block::TickOutcome;
use super::dashboard::{Dashboard, DashboardEvent, StartOutcome};
use super::scheduler::{TickFlow, TickScheduler};

/// Engine handle shared between tasks.
pub type SharedDashboard<C, S> = Arc<Mutex<Dashboard<C, S>>>;

/// Runs a dashboard in real time.
pub struct DashboardService<C, S> {
    dashboard: SharedDashboard<C, S>,
    scheduler: TickScheduler,
}

impl<C, S> DashboardService<C, S>
where
    C: Clock + Send + 'static,
    S: StateStore + Send + 'static,
{
    /// Wraps an engine. Periods come from the engine's configuration.
    pub fn new(dashboard: Dashboard<C, S>) -> Self {
        let scheduler = TickScheduler::new(dashboard.config().tick_period());
        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
            scheduler,
        }
    }

    /// The shared engine.
    pub fn dashboard(&self) -> SharedDashboard<C, S> {
        Arc::clone(&self.dashboard)
    }

    /// The block being ticked, if any.
    pub fn ticking_block(&self) -> Option<BlockId> {
        self.scheduler.active()
    }

    /// Starts a block and its tick task. An early start of block 1 is
    /// counted here.
    pub async fn start(&mut self, block: BlockId) -> StartOutcome {
        let outcome = {
            let mut dashboard = self.dashboard.lock().await;
            let outcome = dashboard.start(block);
            if outcome.is_early_bird() {
                dashboard.record_early_start();
            }
            outcome
        };

        if outcome.started() {
            self.spawn_ticker(block);
        }
        outcome
    }

    /// Opens focus mode on a block and makes sure it is ticking.
    pub async fn enter_focus_mode(&mut self, block: BlockId) -> StartOutcome {
        let outcome = {
            let mut dashboard = self.dashboard.lock().await;
            let outcome = dashboard.enter_focus_mode(block);
            if outcome.is_early_bird() {
                dashboard.record_early_start();
            }
            outcome
        };

        if self.scheduler.active() != Some(block) {
            self.spawn_ticker(block);
        }
        outcome
    }

    /// Pauses a block and stops its tick task.
    pub async fn pause(&mut self, block: BlockId) -> bool {
        if self.scheduler.active() == Some(block) {
            self.scheduler.stop();
        }
        self.dashboard.lock().await.pause(block)
    }

    /// Resets a block and stops its tick task.
    pub async fn reset(&mut self, block: BlockId) {
        if self.scheduler.active() == Some(block) {
            self.scheduler.stop();
        }
        self.dashboard.lock().await.reset(block);
    }

    /// Flips Pomodoro mode on a block.
    pub async fn toggle_pomodoro(&mut self, block: BlockId) -> bool {
        self.dashboard.lock().await.toggle_pomodoro(block)
    }

    /// Waits until the running block stops ticking on its own: completion,
    /// the end of a Pomodoro round, or a pause from another task.
    pub async fn wait_for_block(&mut self) {
        self.scheduler.wait().await;
    }

    /// Spawns the periodic background save.
    pub fn spawn_autosave(&self) -> JoinHandle<()> {
        let dashboard = Arc::clone(&self.dashboard);

        tokio::spawn(async move {
            let period = dashboard.lock().await.config().autosave_period();
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if let Err(e) = dashboard.lock().await.save_state() {
                    tracing::warn!("Autosave failed: {}", e);
                } else {
                    tracing::debug!("Autosaved");
                }
            }
        })
    }

    /// Stops ticking and writes the final save.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.stop();
        self.dashboard
            .lock()
            .await
            .save_state()
            .context("Failed to save state on shutdown")?;
        tracing::info!("State saved on shutdown");
        Ok(())
    }

    fn spawn_ticker(&mut self, block: BlockId) {
        let dashboard = Arc::clone(&self.dashboard);

        self.scheduler.start(block, move |block| {
            let dashboard = Arc::clone(&dashboard);
            async move {
                let (outcome, events, delay) = {
                    let mut dashboard = dashboard.lock().await;
                    let outcome = dashboard.tick_block(block);
                    (
                        outcome,
                        dashboard.event_sender(),
                        dashboard.config().next_block_delay(),
                    )
                };

                if outcome == TickOutcome::Completed {
                    if let Some(next) = block.next() {
                        tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            let _ = events.send(DashboardEvent::NextBlockSuggested { block: next });
                        });
                    }
                }

                if outcome.keeps_running() {
                    TickFlow::Continue
                } else {
                    TickFlow::Stop
                }
            }
        });
    }
}

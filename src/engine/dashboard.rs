//! Dashboard engine.
//!
//! `Dashboard` owns the five block timers, the weekly values, the injected
//! clock and the state reconciler. Every operation is synchronous; callers
//! that need ticking wrap it in a `DashboardService`.
//!
//! Store failures never abort an operation: the in-memory state is kept, the
//! failure is logged and the next save tries again. Only `save_state` and
//! `save_weekly_review` hand the error back.

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};
use tokio::sync::mpsc;

use crate::achievements::{self, AchievementId};
use crate::clock::Clock;
use crate::config::DashboardConfig;
use crate::ledger;
use crate::reconciler::{Restoration, SessionSnapshot, StateReconciler};
use crate::stats::{calculate_stats, Stats};
use crate::store::{StateStore, StoreError};
use crate::types::{
    Area, BlockId, DayRecord, PersistedRecord, StatsCounters, Theme, WeeklyProgress,
    WeeklyReview, BLOCK_COUNT,
};

use super::block::{BlockTimer, TickOutcome};

// ============================================================================
// DashboardEvent
// ============================================================================

/// Events emitted by the engine for notifications and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A block began counting
    BlockStarted {
        block: BlockId,
        /// Block 1 started before the early-bird hour
        early_bird: bool,
    },
    /// A running block stopped
    BlockPaused { block: BlockId },
    /// A block was zeroed
    BlockReset { block: BlockId },
    /// A block reached its target
    BlockCompleted {
        block: BlockId,
        /// The block that follows, if any
        next: Option<BlockId>,
    },
    /// Prompt to start the following block
    NextBlockSuggested { block: BlockId },
    /// Pomodoro mode was switched
    PomodoroModeChanged { block: BlockId, enabled: bool },
    /// A work phase ended
    PomodoroCompleted { block: BlockId, count: u32 },
    /// A break ended
    BreakFinished { block: BlockId, next_pomodoro: u32 },
    /// Four pomodoros done; time for a long break
    PomodoroCycleCompleted { block: BlockId },
    /// Focus mode opened on a block
    FocusModeEntered { block: BlockId },
    /// Focus mode closed
    FocusModeExited,
    /// Every weekly area reached 100%
    PerfectWeek,
    /// An achievement was unlocked for the first time
    AchievementUnlocked { id: AchievementId },
    /// The saved state belonged to an earlier day
    NewDay,
    /// The saved state of today was restored
    StateRestored,
    /// It is Sunday; time for the weekly review
    WeeklyReviewReminder,
    /// The weekly review was stored
    WeeklyReviewSaved,
    /// The theme changed
    ThemeChanged { theme: Theme },
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The block began counting
    Started { early_bird: bool },
    /// The block was already running; nothing changed
    AlreadyRunning,
}

impl StartOutcome {
    pub fn started(&self) -> bool {
        matches!(self, StartOutcome::Started { .. })
    }

    pub fn is_early_bird(&self) -> bool {
        matches!(self, StartOutcome::Started { early_bird: true })
    }
}

/// What `load_state` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Fresh,
    NewDay,
    Restored,
}

// ============================================================================
// Dashboard
// ============================================================================

/// The dashboard engine.
pub struct Dashboard<C, S> {
    config: DashboardConfig,
    clock: C,
    reconciler: StateReconciler<S>,
    timers: [BlockTimer; BLOCK_COUNT],
    weekly_progress: WeeklyProgress,
    theme: Theme,
    focus_block: Option<BlockId>,
    event_tx: mpsc::UnboundedSender<DashboardEvent>,
}

fn fresh_timers() -> [BlockTimer; BLOCK_COUNT] {
    BlockId::ALL.map(BlockTimer::new)
}

impl<C: Clock, S: StateStore> Dashboard<C, S> {
    /// Creates an engine with zeroed timers. Call `load_state` to pick up
    /// the persisted record.
    pub fn new(
        config: DashboardConfig,
        clock: C,
        store: S,
        event_tx: mpsc::UnboundedSender<DashboardEvent>,
    ) -> Self {
        Self {
            config,
            clock,
            reconciler: StateReconciler::new(store),
            timers: fresh_timers(),
            weekly_progress: WeeklyProgress::default(),
            theme: Theme::default(),
            focus_block: None,
            event_tx,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        self.reconciler.store()
    }

    pub fn timers(&self) -> &[BlockTimer] {
        &self.timers
    }

    pub fn timer(&self, block: BlockId) -> &BlockTimer {
        &self.timers[block.index()]
    }

    /// The running block, if any.
    pub fn active_block(&self) -> Option<BlockId> {
        self.timers.iter().find(|t| t.is_running()).map(BlockTimer::id)
    }

    pub fn weekly_progress(&self) -> &WeeklyProgress {
        &self.weekly_progress
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// The block shown in focus mode, if focus mode is open.
    pub fn focus_block(&self) -> Option<BlockId> {
        self.focus_block
    }

    /// A sender for events raised outside the engine (deferred prompts).
    pub fn event_sender(&self) -> mpsc::UnboundedSender<DashboardEvent> {
        self.event_tx.clone()
    }

    /// The persisted record as currently stored.
    pub fn record(&self) -> PersistedRecord {
        self.reconciler.load()
    }

    // ------------------------------------------------------------------------
    // Timer operations
    // ------------------------------------------------------------------------

    /// Starts a block, pausing whichever other block was running.
    pub fn start(&mut self, block: BlockId) -> StartOutcome {
        if self.timer(block).is_running() {
            return StartOutcome::AlreadyRunning;
        }

        if let Some(other) = self.active_block() {
            self.pause(other);
        }

        let now = self.clock.now();
        self.timer_mut(block).start(now);
        let early_bird = block == BlockId::FIRST && self.clock.hour() < self.config.early_bird_hour;

        tracing::info!("Block {} started", block);
        self.emit(DashboardEvent::BlockStarted { block, early_bird });
        self.persist();

        StartOutcome::Started { early_bird }
    }

    /// Pauses a block. Returns false if it was not running.
    pub fn pause(&mut self, block: BlockId) -> bool {
        if !self.timer_mut(block).pause() {
            return false;
        }

        tracing::info!(
            "Block {} paused at {}s",
            block,
            self.timer(block).elapsed_seconds()
        );
        self.emit(DashboardEvent::BlockPaused { block });
        self.persist();
        true
    }

    /// Pauses and zeroes a block.
    pub fn reset(&mut self, block: BlockId) {
        self.pause(block);
        self.timer_mut(block).reset();

        tracing::info!("Block {} reset", block);
        self.emit(DashboardEvent::BlockReset { block });
        self.persist();
    }

    /// Resets all five blocks.
    pub fn reset_all(&mut self) {
        for block in BlockId::all() {
            self.reset(block);
        }
    }

    /// Flips Pomodoro mode on a block and returns the new value.
    pub fn toggle_pomodoro(&mut self, block: BlockId) -> bool {
        let enabled = self.timer_mut(block).toggle_pomodoro();

        tracing::info!("Block {} pomodoro mode: {}", block, enabled);
        self.emit(DashboardEvent::PomodoroModeChanged { block, enabled });
        self.persist();
        enabled
    }

    /// Ticks the running block, if any.
    pub fn tick(&mut self) -> Option<(BlockId, TickOutcome)> {
        let block = self.active_block()?;
        Some((block, self.tick_block(block)))
    }

    /// Advances one block by one second and reacts to the outcome.
    pub fn tick_block(&mut self, block: BlockId) -> TickOutcome {
        let outcome = self.timer_mut(block).tick();

        match outcome {
            TickOutcome::Idle | TickOutcome::Counted => {}
            TickOutcome::Completed => self.on_block_complete(block),
            TickOutcome::PomodoroCompleted { count } => {
                tracing::info!("Block {}: pomodoro {} done", block, count);
                self.emit(DashboardEvent::PomodoroCompleted { block, count });
                self.persist();
            }
            TickOutcome::BreakFinished { next_pomodoro } => {
                tracing::info!("Block {}: break over, pomodoro {}", block, next_pomodoro);
                self.emit(DashboardEvent::BreakFinished {
                    block,
                    next_pomodoro,
                });
                self.persist();
            }
            TickOutcome::CycleCompleted => {
                tracing::info!("Block {}: pomodoro round complete", block);
                self.emit(DashboardEvent::BlockPaused { block });
                self.emit(DashboardEvent::PomodoroCycleCompleted { block });
                self.persist();
            }
        }

        outcome
    }

    fn on_block_complete(&mut self, block: BlockId) {
        let next = block.next();

        tracing::info!("Block {} completed", block);
        self.emit(DashboardEvent::BlockPaused { block });
        self.emit(DashboardEvent::BlockCompleted { block, next });

        self.update_daily_stats();
        self.check_achievements();
        self.persist();
    }

    // ------------------------------------------------------------------------
    // Text, focus and weekly inputs
    // ------------------------------------------------------------------------

    /// Replaces the task text of a block.
    ///
    /// # Errors
    ///
    /// Returns an error if the text could not be saved. The in-memory timer
    /// keeps the new text either way.
    pub fn set_task(&mut self, block: BlockId, task: impl Into<String>) -> Result<(), StoreError> {
        self.timer_mut(block).set_task(task);
        self.save_state()
    }

    /// Replaces the notes of a block. A real change counts toward the notes
    /// achievement.
    ///
    /// # Errors
    ///
    /// Returns an error if changed notes could not be saved. Unchanged notes
    /// write nothing.
    pub fn set_notes(&mut self, block: BlockId, notes: impl Into<String>) -> Result<(), StoreError> {
        if !self.timer_mut(block).set_notes(notes) {
            return Ok(());
        }
        self.save_state()?;
        self.bump_counter(|counters| counters.notes_written += 1);
        self.check_achievements();
        Ok(())
    }

    /// Opens focus mode on a block, starting it if needed.
    pub fn enter_focus_mode(&mut self, block: BlockId) -> StartOutcome {
        let outcome = self.start(block);

        self.focus_block = Some(block);
        tracing::info!("Focus mode on block {}", block);
        self.emit(DashboardEvent::FocusModeEntered { block });

        self.bump_counter(|counters| counters.focus_mode_uses += 1);
        self.check_achievements();
        outcome
    }

    /// Closes focus mode. The block keeps its running state.
    pub fn exit_focus_mode(&mut self) {
        if self.focus_block.take().is_some() {
            self.emit(DashboardEvent::FocusModeExited);
        }
    }

    /// Sets one weekly area and returns the clamped value.
    pub fn set_weekly_progress(&mut self, area: Area, value: i64) -> u8 {
        let stored = self.weekly_progress.set(area, value);
        self.persist();

        if self.weekly_progress.is_perfect() {
            tracing::info!("Perfect week");
            self.bump_counter(|counters| counters.weekly_perfect += 1);
            self.emit(DashboardEvent::PerfectWeek);
            self.check_achievements();
        }

        stored
    }

    /// Switches between the dark and light theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.emit(DashboardEvent::ThemeChanged { theme: self.theme });
        self.persist();
        self.theme
    }

    /// Stores the weekly review, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn save_weekly_review(&mut self, mut review: WeeklyReview) -> Result<(), StoreError> {
        review.date = Some(self.clock.now());
        self.reconciler
            .mutate(|record| record.weekly_review = Some(review))?;

        self.emit(DashboardEvent::WeeklyReviewSaved);
        Ok(())
    }

    /// Counts an early start of block 1.
    pub fn record_early_start(&mut self) {
        self.bump_counter(|counters| counters.early_starts += 1);
        self.check_achievements();
    }

    // ------------------------------------------------------------------------
    // Ledger, stats and achievements
    // ------------------------------------------------------------------------

    /// Writes today's day record from the current timers and returns it.
    pub fn update_daily_stats(&mut self) -> DayRecord {
        let today = self.clock.today();
        let elapsed: Vec<(BlockId, u64)> = self
            .timers
            .iter()
            .map(|t| (t.id(), t.elapsed_seconds()))
            .collect();

        match self
            .reconciler
            .mutate(|record| ledger::record_day(&mut record.history, today, elapsed.iter().copied()))
        {
            Ok(day) => day,
            Err(e) => {
                tracing::warn!("Could not store the day record: {}", e);
                ledger::build_day_record(elapsed)
            }
        }
    }

    /// Computes the statistics snapshot for today.
    pub fn stats(&self) -> Stats {
        calculate_stats(&self.reconciler.load(), self.clock.today())
    }

    /// Unlocks newly satisfied achievements and returns their ids.
    pub fn check_achievements(&mut self) -> Vec<AchievementId> {
        let today = self.clock.today();

        let record = self.reconciler.load();
        let stats = calculate_stats(&record, today);
        let pending = achievements::satisfied(&stats)
            .any(|a| !achievements::is_unlocked(&record.unlocked_achievements, a.id));
        if !pending {
            return Vec::new();
        }

        let fresh = match self.reconciler.mutate(|record| {
            let stats = calculate_stats(record, today);
            achievements::unlock_new(&stats, &mut record.unlocked_achievements)
        }) {
            Ok(fresh) => fresh,
            Err(e) => {
                // Not persisted, so it will be offered again on the next check
                tracing::warn!("Could not store unlocked achievements: {}", e);
                return Vec::new();
            }
        };

        for &id in &fresh {
            tracing::info!("Achievement unlocked: {}", id);
            self.emit(DashboardEvent::AchievementUnlocked { id });
        }
        fresh
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Restores the persisted state for the current day.
    ///
    /// Running timers are paused first; restored timers never tick on their
    /// own.
    pub fn load_state(&mut self) -> LoadOutcome {
        self.timers = fresh_timers();
        self.focus_block = None;

        let outcome = match self.reconciler.restore(self.clock.now()) {
            Restoration::Fresh => LoadOutcome::Fresh,
            Restoration::NewDay {
                saved_day,
                weekly_progress,
                theme,
            } => {
                tracing::info!("New day, last session was on {}", saved_day);
                self.weekly_progress = weekly_progress;
                self.theme = theme;
                self.emit(DashboardEvent::NewDay);
                LoadOutcome::NewDay
            }
            Restoration::SameDay {
                timers,
                weekly_progress,
                theme,
            } => {
                for (block, snapshot) in &timers {
                    self.timer_mut(*block).restore(snapshot);
                }
                self.weekly_progress = weekly_progress;
                self.theme = theme;
                self.emit(DashboardEvent::StateRestored);
                LoadOutcome::Restored
            }
        };

        if self.clock.now().weekday() == Weekday::Sun {
            self.emit(DashboardEvent::WeeklyReviewReminder);
        }

        tracing::debug!("State loaded: {:?}", outcome);
        outcome
    }

    /// Saves the timers, weekly progress and theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn save_state(&self) -> Result<(), StoreError> {
        self.reconciler.save(&self.session_snapshot())
    }

    /// The fields written by `save_state`.
    pub fn session_snapshot(&self) -> SessionSnapshot {
        let timers: BTreeMap<BlockId, _> = self
            .timers
            .iter()
            .map(|t| (t.id(), t.snapshot()))
            .collect();

        SessionSnapshot {
            timers,
            weekly_progress: self.weekly_progress.clone(),
            theme: self.theme,
            last_saved: self.clock.now(),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.save_state() {
            tracing::warn!("Could not save state: {}", e);
        }
    }

    fn bump_counter<F>(&self, f: F)
    where
        F: FnOnce(&mut StatsCounters),
    {
        if let Err(e) = self.reconciler.mutate(|record| f(&mut record.stats)) {
            tracing::warn!("Could not update counters: {}", e);
        }
    }

    fn timer_mut(&mut self, block: BlockId) -> &mut BlockTimer {
        &mut self.timers[block.index()]
    }

    fn emit(&self, event: DashboardEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Block timer state machine.
//!
//! A `BlockTimer` counts elapsed seconds upward for one block. It knows
//! nothing about scheduling or persistence: the dashboard calls `tick()` once
//! per period and reacts to the returned [`TickOutcome`].

use chrono::{DateTime, FixedOffset};

use crate::types::{BlockId, PomodoroPhase, TimerSnapshot, POMODOROS_PER_CYCLE};

/// Upper bound for elapsed time read back from a snapshot.
const MAX_RESTORED_SECONDS: u64 = 24 * 60 * 60;

// ============================================================================
// TickOutcome
// ============================================================================

/// Result of advancing a block timer by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The block was not running; nothing changed
    Idle,
    /// One second was counted
    Counted,
    /// The block reached its target and paused itself
    Completed,
    /// A work phase ended; the block moved to its break
    PomodoroCompleted {
        /// Pomodoros completed in this round
        count: u32,
    },
    /// A break ended; the next work phase began
    BreakFinished {
        /// Number of the pomodoro that starts now
        next_pomodoro: u32,
    },
    /// The last break of a round ended; the block paused itself
    CycleCompleted,
}

impl TickOutcome {
    /// Returns true if the block is still running after this tick.
    pub fn keeps_running(&self) -> bool {
        matches!(
            self,
            TickOutcome::Counted
                | TickOutcome::PomodoroCompleted { .. }
                | TickOutcome::BreakFinished { .. }
        )
    }
}

// ============================================================================
// BlockTimer
// ============================================================================

/// Timer state of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTimer {
    id: BlockId,
    elapsed_seconds: u64,
    running: bool,
    task: String,
    notes: String,
    pomodoro_mode: bool,
    pomodoro_count: u32,
    pomodoro_phase: PomodoroPhase,
    start_time: Option<DateTime<FixedOffset>>,
    interrupted: bool,
}

impl BlockTimer {
    /// Creates a zeroed, paused timer.
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            elapsed_seconds: 0,
            running: false,
            task: String::new(),
            notes: String::new(),
            pomodoro_mode: false,
            pomodoro_count: 0,
            pomodoro_phase: PomodoroPhase::Work,
            start_time: None,
            interrupted: false,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn pomodoro_mode(&self) -> bool {
        self.pomodoro_mode
    }

    pub fn pomodoro_count(&self) -> u32 {
        self.pomodoro_count
    }

    pub fn pomodoro_phase(&self) -> PomodoroPhase {
        self.pomodoro_phase
    }

    /// When the block was last started in this process.
    pub fn start_time(&self) -> Option<DateTime<FixedOffset>> {
        self.start_time
    }

    /// True if the block was running when the state was last saved and has
    /// not been started since.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Target of the block in seconds.
    pub fn target_seconds(&self) -> u64 {
        self.id.target_seconds()
    }

    /// Target of whatever is being counted right now: the Pomodoro phase in
    /// Pomodoro mode, the block target otherwise.
    pub fn current_target_seconds(&self) -> u64 {
        if self.pomodoro_mode {
            self.pomodoro_phase.target_seconds()
        } else {
            self.target_seconds()
        }
    }

    /// Progress toward the current target, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        let target = self.current_target_seconds();
        if target == 0 {
            return 100.0;
        }
        (self.elapsed_seconds as f64 / target as f64 * 100.0).min(100.0)
    }

    /// Starts counting. Returns false if the block was already running.
    pub fn start(&mut self, now: DateTime<FixedOffset>) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.start_time = Some(now);
        self.interrupted = false;
        true
    }

    /// Stops counting. Returns false if the block was not running.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Pauses and zeroes the elapsed time and the Pomodoro round.
    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_seconds = 0;
        self.pomodoro_count = 0;
        self.pomodoro_phase = PomodoroPhase::Work;
        self.interrupted = false;
    }

    /// Flips Pomodoro mode and returns the new value.
    ///
    /// Leaving Pomodoro mode drops the round but keeps the elapsed time.
    pub fn toggle_pomodoro(&mut self) -> bool {
        self.pomodoro_mode = !self.pomodoro_mode;
        if !self.pomodoro_mode {
            self.pomodoro_count = 0;
            self.pomodoro_phase = PomodoroPhase::Work;
        }
        self.pomodoro_mode
    }

    /// Replaces the task text.
    pub fn set_task(&mut self, task: impl Into<String>) {
        self.task = task.into();
    }

    /// Replaces the notes text. Returns true if the text changed.
    pub fn set_notes(&mut self, notes: impl Into<String>) -> bool {
        let notes = notes.into();
        if notes == self.notes {
            return false;
        }
        self.notes = notes;
        true
    }

    /// Advances the timer by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);

        if self.pomodoro_mode {
            return self.advance_pomodoro();
        }

        // Edge-triggered: a block left running past its target keeps counting
        // without completing again
        if self.elapsed_seconds == self.target_seconds() {
            self.running = false;
            return TickOutcome::Completed;
        }

        TickOutcome::Counted
    }

    fn advance_pomodoro(&mut self) -> TickOutcome {
        if self.elapsed_seconds < self.pomodoro_phase.target_seconds() {
            return TickOutcome::Counted;
        }

        self.elapsed_seconds = 0;

        match self.pomodoro_phase {
            PomodoroPhase::Work => {
                self.pomodoro_count += 1;
                self.pomodoro_phase = PomodoroPhase::Break;
                TickOutcome::PomodoroCompleted {
                    count: self.pomodoro_count,
                }
            }
            PomodoroPhase::Break => {
                self.pomodoro_phase = PomodoroPhase::Work;
                if self.pomodoro_count >= POMODOROS_PER_CYCLE {
                    self.pomodoro_count = 0;
                    self.running = false;
                    TickOutcome::CycleCompleted
                } else {
                    TickOutcome::BreakFinished {
                        next_pomodoro: self.pomodoro_count + 1,
                    }
                }
            }
        }
    }

    /// Captures the persisted form of this timer.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            elapsed_seconds: self.elapsed_seconds,
            is_running: self.running,
            task: self.task.clone(),
            notes: self.notes.clone(),
            pomodoro_mode: self.pomodoro_mode,
            pomodoro_count: self.pomodoro_count,
            pomodoro_phase: self.pomodoro_phase,
        }
    }

    /// Restores a persisted snapshot.
    ///
    /// The block comes back paused; a snapshot saved while running only sets
    /// the interrupted flag. Elapsed time is capped at one day.
    pub fn restore(&mut self, snapshot: &TimerSnapshot) {
        self.elapsed_seconds = snapshot.elapsed_seconds.min(MAX_RESTORED_SECONDS);
        self.running = false;
        self.task = snapshot.task.clone();
        self.notes = snapshot.notes.clone();
        self.pomodoro_mode = snapshot.pomodoro_mode;
        self.pomodoro_count = snapshot.pomodoro_count.min(POMODOROS_PER_CYCLE);
        self.pomodoro_phase = snapshot.pomodoro_phase;
        self.start_time = None;
        self.interrupted = snapshot.is_running;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{POMODORO_BREAK_SECONDS, POMODORO_WORK_SECONDS};

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-03-10T09:00:00+01:00").unwrap()
    }

    fn running_timer(block: u8) -> BlockTimer {
        let mut timer = BlockTimer::new(BlockId::new(block).unwrap());
        timer.start(now());
        timer
    }

    fn tick_n(timer: &mut BlockTimer, n: u64) -> Vec<TickOutcome> {
        (0..n).map(|_| timer.tick()).collect()
    }

    // ------------------------------------------------------------------------
    // Lifecycle Tests
    // ------------------------------------------------------------------------

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_new_timer_is_zeroed() {
            let timer = BlockTimer::new(BlockId::FIRST);
            assert_eq!(timer.elapsed_seconds(), 0);
            assert!(!timer.is_running());
            assert_eq!(timer.pomodoro_phase(), PomodoroPhase::Work);
            assert_eq!(timer.target_seconds(), 75 * 60);
        }

        #[test]
        fn test_start_is_noop_when_running() {
            let mut timer = running_timer(1);
            assert!(!timer.start(now()));
            assert_eq!(timer.start_time(), Some(now()));
        }

        #[test]
        fn test_pause_is_idempotent() {
            let mut timer = running_timer(1);
            assert!(timer.pause());
            assert!(!timer.pause());
        }

        #[test]
        fn test_tick_when_paused_is_idle() {
            let mut timer = BlockTimer::new(BlockId::FIRST);
            assert_eq!(timer.tick(), TickOutcome::Idle);
            assert_eq!(timer.elapsed_seconds(), 0);
        }

        #[test]
        fn test_pause_keeps_elapsed() {
            let mut timer = running_timer(2);
            tick_n(&mut timer, 42);
            timer.pause();
            assert_eq!(timer.elapsed_seconds(), 42);
        }

        #[test]
        fn test_reset_zeroes_everything_but_text() {
            let mut timer = running_timer(3);
            timer.set_task("Modelado");
            timer.toggle_pomodoro();
            tick_n(&mut timer, POMODORO_WORK_SECONDS + 10);

            timer.reset();

            assert!(!timer.is_running());
            assert_eq!(timer.elapsed_seconds(), 0);
            assert_eq!(timer.pomodoro_count(), 0);
            assert_eq!(timer.pomodoro_phase(), PomodoroPhase::Work);
            assert_eq!(timer.task(), "Modelado");
        }

        #[test]
        fn test_set_notes_reports_change() {
            let mut timer = BlockTimer::new(BlockId::FIRST);
            assert!(timer.set_notes("idea"));
            assert!(!timer.set_notes("idea"));
            assert!(timer.set_notes(""));
        }
    }

    // ------------------------------------------------------------------------
    // Completion Tests
    // ------------------------------------------------------------------------

    mod completion_tests {
        use super::*;

        #[test]
        fn test_completes_exactly_at_target() {
            // Block 5 targets 17 min
            let mut timer = running_timer(5);
            let outcomes = tick_n(&mut timer, 17 * 60);

            assert_eq!(outcomes.last(), Some(&TickOutcome::Completed));
            assert!(outcomes[..outcomes.len() - 1]
                .iter()
                .all(|o| *o == TickOutcome::Counted));
            assert!(!timer.is_running());
        }

        #[test]
        fn test_completion_fires_once() {
            let mut timer = running_timer(5);
            tick_n(&mut timer, 17 * 60);

            // Resuming past the target never completes again
            timer.start(now());
            let outcomes = tick_n(&mut timer, 120);
            assert!(outcomes.iter().all(|o| *o == TickOutcome::Counted));
            assert_eq!(timer.elapsed_seconds(), 17 * 60 + 120);
        }

        #[test]
        fn test_keeps_running() {
            assert!(TickOutcome::Counted.keeps_running());
            assert!(TickOutcome::BreakFinished { next_pomodoro: 2 }.keeps_running());
            assert!(!TickOutcome::Completed.keeps_running());
            assert!(!TickOutcome::CycleCompleted.keeps_running());
            assert!(!TickOutcome::Idle.keeps_running());
        }
    }

    // ------------------------------------------------------------------------
    // Pomodoro Tests
    // ------------------------------------------------------------------------

    mod pomodoro_tests {
        use super::*;

        fn pomodoro_timer() -> BlockTimer {
            let mut timer = running_timer(1);
            timer.toggle_pomodoro();
            timer
        }

        #[test]
        fn test_work_phase_moves_to_break() {
            let mut timer = pomodoro_timer();
            let outcomes = tick_n(&mut timer, POMODORO_WORK_SECONDS);

            assert_eq!(
                outcomes.last(),
                Some(&TickOutcome::PomodoroCompleted { count: 1 })
            );
            assert_eq!(timer.pomodoro_phase(), PomodoroPhase::Break);
            assert_eq!(timer.pomodoro_count(), 1);
            assert_eq!(timer.elapsed_seconds(), 0);
            assert!(timer.is_running());
        }

        #[test]
        fn test_break_moves_back_to_work() {
            let mut timer = pomodoro_timer();
            tick_n(&mut timer, POMODORO_WORK_SECONDS);
            let outcomes = tick_n(&mut timer, POMODORO_BREAK_SECONDS);

            assert_eq!(
                outcomes.last(),
                Some(&TickOutcome::BreakFinished { next_pomodoro: 2 })
            );
            assert_eq!(timer.pomodoro_phase(), PomodoroPhase::Work);
            assert_eq!(timer.elapsed_seconds(), 0);
        }

        #[test]
        fn test_four_cycles_pause_and_reset_count() {
            let mut timer = pomodoro_timer();
            let cycle = POMODORO_WORK_SECONDS + POMODORO_BREAK_SECONDS;
            let outcomes = tick_n(&mut timer, cycle * 4);

            assert_eq!(outcomes.last(), Some(&TickOutcome::CycleCompleted));
            assert!(!timer.is_running());
            assert_eq!(timer.pomodoro_count(), 0);
            assert_eq!(timer.pomodoro_phase(), PomodoroPhase::Work);

            let completed = outcomes
                .iter()
                .filter(|o| matches!(o, TickOutcome::PomodoroCompleted { .. }))
                .count();
            assert_eq!(completed, 4);
        }

        #[test]
        fn test_block_target_is_ignored_in_pomodoro_mode() {
            // Block 5 (17 min) would complete at 1020 s without Pomodoro
            let mut timer = running_timer(5);
            timer.toggle_pomodoro();
            let outcomes = tick_n(&mut timer, 17 * 60);
            assert!(!outcomes.contains(&TickOutcome::Completed));
            assert!(timer.is_running());
        }

        #[test]
        fn test_toggle_off_keeps_elapsed() {
            let mut timer = pomodoro_timer();
            tick_n(&mut timer, POMODORO_WORK_SECONDS + 30);

            assert!(!timer.toggle_pomodoro());
            assert_eq!(timer.elapsed_seconds(), 30);
            assert_eq!(timer.pomodoro_count(), 0);
            assert_eq!(timer.pomodoro_phase(), PomodoroPhase::Work);
        }
    }

    // ------------------------------------------------------------------------
    // Snapshot Tests
    // ------------------------------------------------------------------------

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_restore_marks_interrupted_and_stays_paused() {
            let mut source = running_timer(2);
            source.set_task("Lectura");
            source.set_notes("cap. 3");
            tick_n(&mut source, 600);
            let snapshot = source.snapshot();
            assert!(snapshot.is_running);

            let mut restored = BlockTimer::new(BlockId::new(2).unwrap());
            restored.restore(&snapshot);

            assert!(!restored.is_running());
            assert!(restored.is_interrupted());
            assert_eq!(restored.elapsed_seconds(), 600);
            assert_eq!(restored.task(), "Lectura");
            assert_eq!(restored.notes(), "cap. 3");
            assert_eq!(restored.tick(), TickOutcome::Idle);
        }

        #[test]
        fn test_start_clears_interrupted() {
            let mut timer = BlockTimer::new(BlockId::FIRST);
            timer.restore(&TimerSnapshot {
                is_running: true,
                ..TimerSnapshot::default()
            });
            timer.start(now());
            assert!(!timer.is_interrupted());
        }

        #[test]
        fn test_restore_clamps_pomodoro_count() {
            let mut timer = BlockTimer::new(BlockId::FIRST);
            timer.restore(&TimerSnapshot {
                pomodoro_mode: true,
                pomodoro_count: 9,
                ..TimerSnapshot::default()
            });
            assert_eq!(timer.pomodoro_count(), POMODOROS_PER_CYCLE);
        }

        #[test]
        fn test_restore_caps_huge_elapsed_and_ticks_on() {
            let mut timer = BlockTimer::new(BlockId::FIRST);
            timer.restore(&TimerSnapshot {
                elapsed_seconds: u64::MAX,
                ..TimerSnapshot::default()
            });
            assert_eq!(timer.elapsed_seconds(), MAX_RESTORED_SECONDS);

            timer.start(now());
            assert_eq!(timer.tick(), TickOutcome::Counted);
            assert_eq!(timer.elapsed_seconds(), MAX_RESTORED_SECONDS + 1);
        }
    }
}

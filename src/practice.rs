//! Presence practice: a short guided breathing countdown.

use std::fmt;

/// Length of one practice session in seconds.
pub const PRACTICE_SECONDS: u32 = 180;

/// Seconds spent in each breathing step.
pub const BREATH_STEP_SECONDS: u32 = 4;

/// One step of the breathing pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathStep {
    Inhale,
    Hold,
    Exhale,
    Pause,
}

impl BreathStep {
    const CYCLE: [BreathStep; 4] = [
        BreathStep::Inhale,
        BreathStep::Hold,
        BreathStep::Exhale,
        BreathStep::Pause,
    ];

    /// Instruction shown to the user.
    pub fn prompt(&self) -> &'static str {
        match self {
            BreathStep::Inhale => "Inhala profundamente...",
            BreathStep::Hold => "Sostén...",
            BreathStep::Exhale => "Exhala lentamente...",
            BreathStep::Pause => "Pausa...",
        }
    }
}

impl fmt::Display for BreathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt())
    }
}

/// Countdown state of one practice session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreathingSession {
    elapsed: u32,
}

impl Default for BreathingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathingSession {
    pub fn new() -> Self {
        Self { elapsed: 0 }
    }

    pub fn remaining_seconds(&self) -> u32 {
        PRACTICE_SECONDS.saturating_sub(self.elapsed)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= PRACTICE_SECONDS
    }

    /// The current breathing step.
    pub fn step(&self) -> BreathStep {
        let index = (self.elapsed / BREATH_STEP_SECONDS) as usize % BreathStep::CYCLE.len();
        BreathStep::CYCLE[index]
    }

    /// Advances one second.
    ///
    /// Returns the new step when this second starts one, `None` otherwise.
    pub fn tick(&mut self) -> Option<BreathStep> {
        if self.is_finished() {
            return None;
        }
        self.elapsed += 1;
        if self.is_finished() || self.elapsed % BREATH_STEP_SECONDS != 0 {
            return None;
        }
        Some(self.step())
    }
}

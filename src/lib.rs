//! blockday library
//!
//! This library provides the core of the blockday daily dashboard.
//! It includes:
//! - Block timers with an optional Pomodoro cycle, driven by a tick scheduler
//! - The dashboard engine, its events and the async service around it
//! - Lenient, merge-preserving persistence of the dashboard record
//! - The daily history ledger, statistics and achievements
//! - The weekly plan and the breathing practice
//! - CLI command parsing and display utilities

pub mod achievements;
pub mod cli;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod plan;
pub mod practice;
pub mod reconciler;
pub mod stats;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use achievements::{Achievement, AchievementId};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::DashboardConfig;
pub use engine::{
    BlockTimer, Dashboard, DashboardEvent, DashboardService, LoadOutcome, StartOutcome,
    TickOutcome,
};
pub use error::DashboardError;
pub use reconciler::{Restoration, StateReconciler};
pub use stats::{calculate_stats, Stats};
pub use store::{FileStore, MemoryStore, StateStore, StoreError};
pub use types::{
    Area, BlockId, PersistedRecord, PomodoroPhase, Theme, TimerSnapshot, WeeklyProgress,
    WeeklyReview,
};

//! Dashboard engine: block timers, the tick scheduler and the async service.
//!
//! - `block`: per-block state machine (elapsed time and the Pomodoro phases)
//! - `dashboard`: the engine that owns the five timers and emits events
//! - `scheduler`: the single cancellable tick task
//! - `service`: tokio glue for ticking, autosave and teardown

pub mod block;
pub mod dashboard;
pub mod scheduler;
pub mod service;

pub use block::{BlockTimer, TickOutcome};
pub use dashboard::{Dashboard, DashboardEvent, LoadOutcome, StartOutcome};
pub use scheduler::{TickFlow, TickScheduler};
pub use service::{DashboardService, SharedDashboard};

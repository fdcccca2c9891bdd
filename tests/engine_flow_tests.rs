//! Engine flow tests.
//!
//! These tests drive the public API the way the CLI does:
//! - One running block at a time
//! - Save in one session, load in the next
//! - Day rollover leaves past days alone
//! - Ledger, streak and achievements across sessions
//! - Pomodoro rounds through the async service

use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::mpsc;

use blockday::engine::TickOutcome;
use blockday::{
    BlockId, Dashboard, DashboardConfig, DashboardEvent, DashboardService, LoadOutcome,
    MemoryStore, MockClock, PomodoroPhase,
};

// ============================================================================
// Test Helpers
// ============================================================================

type TestDashboard = Dashboard<MockClock, MemoryStore>;
type Events = mpsc::UnboundedReceiver<DashboardEvent>;

fn block(n: u8) -> BlockId {
    BlockId::new(n).unwrap()
}

/// Opens a session over a shared store, the way each CLI command does.
fn open_session(clock: &MockClock, store: &MemoryStore) -> (TestDashboard, Events, LoadOutcome) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut dashboard = Dashboard::new(DashboardConfig::default(), clock.clone(), store.clone(), tx);
    let outcome = dashboard.load_state();
    (dashboard, rx, outcome)
}

fn drain(rx: &mut Events) -> Vec<DashboardEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn run_to_completion(dashboard: &mut TestDashboard, id: BlockId) {
    dashboard.start(id);
    for _ in 0..id.target_seconds() {
        dashboard.tick();
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Single Active Block
// ============================================================================

#[test]
fn test_only_one_block_runs_across_starts() {
    let clock = MockClock::at("2026-03-10T09:00:00+01:00");
    let store = MemoryStore::new();
    let (mut dashboard, _rx, _) = open_session(&clock, &store);

    for n in [1, 2, 5, 3, 3, 4] {
        dashboard.start(block(n));
        let running = dashboard.timers().iter().filter(|t| t.is_running()).count();
        assert_eq!(running, 1);
        assert_eq!(dashboard.active_block(), Some(block(n)));
    }

    dashboard.pause(block(4));
    assert_eq!(dashboard.active_block(), None);
    assert!(dashboard.tick().is_none());
}

// ============================================================================
// Session Round Trip
// ============================================================================

#[test]
fn test_next_session_same_day_sees_paused_progress() {
    let clock = MockClock::at("2026-03-10T09:00:00+01:00");
    let store = MemoryStore::new();

    {
        let (mut dashboard, _rx, outcome) = open_session(&clock, &store);
        assert_eq!(outcome, LoadOutcome::Fresh);

        dashboard.set_task(block(2), "Capítulo 4").unwrap();
        dashboard.toggle_pomodoro(block(5));
        dashboard.start(block(2));
        for _ in 0..90 {
            dashboard.tick();
        }
        // Interrupted: the session ends while the block runs
        dashboard.save_state().unwrap();
    }

    clock.advance(chrono::Duration::hours(2));
    let (dashboard, mut rx, outcome) = open_session(&clock, &store);

    assert_eq!(outcome, LoadOutcome::Restored);
    assert_eq!(drain(&mut rx), vec![DashboardEvent::StateRestored]);

    let timer = dashboard.timer(block(2));
    assert_eq!(timer.elapsed_seconds(), 90);
    assert_eq!(timer.task(), "Capítulo 4");
    assert!(!timer.is_running());
    assert!(timer.is_interrupted());
    assert!(dashboard.timer(block(5)).pomodoro_mode());
    assert_eq!(dashboard.active_block(), None);
}

#[test]
fn test_rollover_keeps_weekly_values_and_leaves_history_alone() {
    let clock = MockClock::at("2026-03-10T21:00:00+01:00");
    let store = MemoryStore::new();

    {
        let (mut dashboard, _rx, _) = open_session(&clock, &store);
        dashboard.set_weekly_progress(blockday::Area::Lectura, 60);
        dashboard.toggle_theme();
        dashboard.start(block(5));
        for _ in 0..600 {
            dashboard.tick();
        }
        dashboard.pause(block(5));
    }

    clock.advance(chrono::Duration::hours(12));
    let (mut dashboard, mut rx, outcome) = open_session(&clock, &store);

    assert_eq!(outcome, LoadOutcome::NewDay);
    assert!(drain(&mut rx).contains(&DashboardEvent::NewDay));
    assert!(dashboard.timers().iter().all(|t| t.elapsed_seconds() == 0));
    assert_eq!(dashboard.weekly_progress().get(blockday::Area::Lectura), 60);
    assert_eq!(dashboard.theme(), blockday::Theme::Light);

    // Yesterday never completed a block, so it never reached the ledger
    assert!(!dashboard.record().history.contains_key(&date(2026, 3, 10)));
    assert!(dashboard.check_achievements().is_empty());

    // Sealing the rollover makes the next load a same-day restore
    dashboard.save_state().unwrap();
    let (_, _, outcome) = open_session(&clock, &store);
    assert_eq!(outcome, LoadOutcome::Restored);
}

// ============================================================================
// Ledger and Achievements
// ============================================================================

#[test]
fn test_three_completed_blocks_make_a_streak_day() {
    let clock = MockClock::at("2026-03-10T08:00:00+01:00");
    let store = MemoryStore::new();
    let (mut dashboard, mut rx, _) = open_session(&clock, &store);

    for n in [2, 4, 5] {
        run_to_completion(&mut dashboard, block(n));
    }

    let stats = dashboard.stats();
    assert_eq!(stats.blocks_completed_today, 3);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.days_completed, 1);

    let events = drain(&mut rx);
    let completed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            DashboardEvent::BlockCompleted { block, .. } => Some(block.get()),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![2, 4, 5]);
    assert!(events.contains(&DashboardEvent::BlockCompleted {
        block: block(5),
        next: None,
    }));
    assert!(events.contains(&DashboardEvent::AchievementUnlocked {
        id: blockday::AchievementId::FirstDay,
    }));
}

#[test]
fn test_achievements_are_announced_once_across_sessions() {
    let clock = MockClock::at("2026-03-10T08:00:00+01:00");
    let store = MemoryStore::new();

    {
        let (mut dashboard, mut rx, _) = open_session(&clock, &store);
        dashboard.set_notes(block(1), "Primera nota").unwrap();
        assert!(!drain(&mut rx)
            .iter()
            .any(|e| matches!(e, DashboardEvent::AchievementUnlocked { .. })));
        run_to_completion(&mut dashboard, block(5));
        assert!(drain(&mut rx).contains(&DashboardEvent::AchievementUnlocked {
            id: blockday::AchievementId::FirstDay,
        }));
    }

    let (mut dashboard, mut rx, _) = open_session(&clock, &store);
    assert!(dashboard.check_achievements().is_empty());
    assert!(!drain(&mut rx)
        .iter()
        .any(|e| matches!(e, DashboardEvent::AchievementUnlocked { .. })));
    assert_eq!(
        dashboard
            .record()
            .unlocked_achievements
            .iter()
            .filter(|id| id.as_str() == "first_day")
            .count(),
        1
    );
}

#[test]
fn test_unknown_fields_survive_a_session() {
    let clock = MockClock::at("2026-03-10T08:00:00+01:00");
    let store = MemoryStore::with_document(
        serde_json::json!({
            "theme": "dark",
            "customWidget": { "enabled": true },
            "unlockedAchievements": ["legacy_badge"],
        })
        .to_string(),
    );

    let (mut dashboard, _rx, _) = open_session(&clock, &store);
    dashboard.set_task(block(1), "Sentadillas").unwrap();
    run_to_completion(&mut dashboard, block(5));

    let json = store.json().unwrap();
    assert_eq!(json["customWidget"]["enabled"], true);
    let unlocked = json["unlockedAchievements"].as_array().unwrap();
    assert_eq!(unlocked[0], "legacy_badge");
    assert!(unlocked.iter().any(|v| v == "first_day"));
    assert_eq!(json["timers"]["1"]["task"], "Sentadillas");
}

#[test]
fn test_malformed_day_survives_later_writes() {
    let clock = MockClock::at("2026-03-10T08:00:00+01:00");
    let store = MemoryStore::with_document(
        serde_json::json!({
            "history": {
                "2026-03-01": { "blocks": { "1": 4500 }, "blocksCompleted": 1, "totalMinutes": 75.0 },
                "2026-03-02": { "blocks": { "1": 60 }, "blocksCompleted": 0, "totalMinutes": null }
            }
        })
        .to_string(),
    );

    let (mut dashboard, _rx, _) = open_session(&clock, &store);
    dashboard.set_notes(block(1), "x").unwrap();
    run_to_completion(&mut dashboard, block(5));

    let json = store.json().unwrap();
    let history = json["history"].as_object().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history["2026-03-01"]["blocksCompleted"], 1);
    assert!(history["2026-03-02"]["totalMinutes"].is_null());
    assert_eq!(history["2026-03-10"]["blocksCompleted"], 1);
    assert_eq!(json["stats"]["notesWritten"], 1);
}

// ============================================================================
// Pomodoro Through The Service
// ============================================================================

#[test]
fn test_pomodoro_round_returns_to_work_and_stops() {
    let clock = MockClock::at("2026-03-10T10:00:00+01:00");
    let store = MemoryStore::new();
    let (mut dashboard, mut rx, _) = open_session(&clock, &store);

    dashboard.toggle_pomodoro(block(3));
    dashboard.start(block(3));

    let mut outcomes = Vec::new();
    while dashboard.timer(block(3)).is_running() {
        let (_, outcome) = dashboard.tick().unwrap();
        if !matches!(outcome, TickOutcome::Counted) {
            outcomes.push(outcome);
        }
    }

    assert_eq!(outcomes.len(), 8);
    assert_eq!(outcomes[0], TickOutcome::PomodoroCompleted { count: 1 });
    assert_eq!(outcomes[1], TickOutcome::BreakFinished { next_pomodoro: 2 });
    assert_eq!(outcomes[6], TickOutcome::PomodoroCompleted { count: 4 });
    assert_eq!(outcomes[7], TickOutcome::CycleCompleted);

    let timer = dashboard.timer(block(3));
    assert_eq!(timer.pomodoro_count(), 0);
    assert_eq!(timer.pomodoro_phase(), PomodoroPhase::Work);
    assert!(drain(&mut rx).contains(&DashboardEvent::PomodoroCycleCompleted { block: block(3) }));
}

#[tokio::test]
async fn test_service_runs_short_block_to_completion() {
    let clock = MockClock::at("2026-03-10T10:00:00+01:00");
    let store = MemoryStore::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let config = DashboardConfig::default()
        .with_tick_millis(1)
        .with_next_block_delay_seconds(0);
    let mut dashboard = Dashboard::new(config, clock, store.clone(), tx);
    dashboard.load_state();

    let mut service = DashboardService::new(dashboard);
    service.start(block(5)).await;

    tokio::time::timeout(Duration::from_secs(30), service.wait_for_block())
        .await
        .expect("block should complete");

    assert_eq!(service.ticking_block(), None);
    {
        let shared = service.dashboard();
        let dashboard = shared.lock().await;
        assert_eq!(dashboard.timer(block(5)).elapsed_seconds(), 17 * 60);
        assert!(!dashboard.timer(block(5)).is_running());
    }

    service.shutdown().await.unwrap();
    let events = drain(&mut rx);
    assert!(events.contains(&DashboardEvent::BlockCompleted {
        block: block(5),
        next: None,
    }));
    // The last block suggests nothing
    assert!(!events
        .iter()
        .any(|e| matches!(e, DashboardEvent::NextBlockSuggested { .. })));
    assert_eq!(store.json().unwrap()["timers"]["5"]["elapsedSeconds"], 17 * 60);
}

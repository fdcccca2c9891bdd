//! Statistics engine.
//!
//! `calculate_stats` is a pure function of the persisted record and the
//! current date. It walks the history backward from today for streaks and
//! consistency, and overlays the action counters that history cannot
//! reconstruct.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::types::{History, PersistedRecord, STREAK_MIN_BLOCKS};

/// Longest streak the backward walk will count.
pub const STREAK_LOOKBACK_DAYS: u64 = 365;

/// Window of the consistency rate, today included.
pub const CONSISTENCY_WINDOW_DAYS: u64 = 30;

/// Derived statistics snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Consecutive qualifying days ending today
    pub current_streak: u32,
    /// Hours tracked across all history
    pub total_hours: f64,
    /// Percentage of qualifying days over the last 30
    pub consistency_rate: u32,
    /// Blocks completed today
    pub blocks_completed_today: u8,
    pub early_starts: u32,
    pub weekly_perfect: u32,
    pub focus_mode_uses: u32,
    pub notes_written: u32,
    /// Dates present in history
    pub days_completed: u32,
}

/// Computes the statistics snapshot for `today`.
pub fn calculate_stats(record: &PersistedRecord, today: NaiveDate) -> Stats {
    let history = &record.history;
    let counters = record.stats;

    Stats {
        current_streak: current_streak(history, today),
        total_hours: history.values().map(|day| day.total_minutes / 60.0).sum(),
        consistency_rate: consistency_rate(history, today),
        blocks_completed_today: history.get(&today).map_or(0, |day| day.blocks_completed),
        early_starts: counters.early_starts,
        weekly_perfect: counters.weekly_perfect,
        focus_mode_uses: counters.focus_mode_uses,
        notes_written: counters.notes_written,
        days_completed: history.len() as u32,
    }
}

/// Returns true if `day` has enough completed blocks to count.
pub fn is_qualifying_day(history: &History, day: NaiveDate) -> bool {
    history
        .get(&day)
        .is_some_and(|record| record.blocks_completed >= STREAK_MIN_BLOCKS)
}

/// Counts consecutive qualifying days walking back from `today` (inclusive).
pub fn current_streak(history: &History, today: NaiveDate) -> u32 {
    trailing_days(today, STREAK_LOOKBACK_DAYS)
        .take_while(|&day| is_qualifying_day(history, day))
        .count() as u32
}

/// Percentage of qualifying days in the 30 days ending `today`, rounded.
pub fn consistency_rate(history: &History, today: NaiveDate) -> u32 {
    let qualifying = trailing_days(today, CONSISTENCY_WINDOW_DAYS)
        .filter(|&day| is_qualifying_day(history, day))
        .count();
    (qualifying as f64 / CONSISTENCY_WINDOW_DAYS as f64 * 100.0).round() as u32
}

fn trailing_days(today: NaiveDate, count: u64) -> impl Iterator<Item = NaiveDate> {
    (0..count).map_while(move |offset| today.checked_sub_days(Days::new(offset)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DayRecord, StatsCounters};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn days_ago(n: u64) -> NaiveDate {
        today() - Days::new(n)
    }

    fn day(blocks_completed: u8, total_minutes: f64) -> DayRecord {
        DayRecord {
            blocks_completed,
            total_minutes,
            ..DayRecord::default()
        }
    }

    fn record_with(entries: &[(u64, u8)]) -> PersistedRecord {
        let mut record = PersistedRecord::default();
        for &(ago, completed) in entries {
            record.history.insert(days_ago(ago), day(completed, 60.0));
        }
        record
    }

    // ------------------------------------------------------------------------
    // Streak Tests
    // ------------------------------------------------------------------------

    mod streak_tests {
        use super::*;

        #[test]
        fn test_empty_history_has_no_streak() {
            let stats = calculate_stats(&PersistedRecord::default(), today());
            assert_eq!(stats.current_streak, 0);
            assert_eq!(stats.consistency_rate, 0);
        }

        #[test]
        fn test_weak_day_breaks_chain() {
            let record = record_with(&[(0, 4), (1, 2), (2, 5)]);
            assert_eq!(calculate_stats(&record, today()).current_streak, 1);
        }

        #[test]
        fn test_missing_today_means_zero_streak() {
            let record = record_with(&[(1, 5), (2, 5), (3, 5)]);
            assert_eq!(calculate_stats(&record, today()).current_streak, 0);
        }

        #[test]
        fn test_consecutive_days_count() {
            let record = record_with(&[(0, 3), (1, 3), (2, 5), (3, 4), (5, 5)]);
            assert_eq!(calculate_stats(&record, today()).current_streak, 4);
        }

        #[test]
        fn test_streak_caps_at_lookback() {
            let entries: Vec<(u64, u8)> = (0..400).map(|ago| (ago, 5)).collect();
            let record = record_with(&entries);
            assert_eq!(calculate_stats(&record, today()).current_streak, 365);
        }

        #[test]
        fn test_future_entries_are_ignored() {
            let mut record = record_with(&[(0, 3)]);
            record.history.insert(today() + Days::new(1), day(5, 60.0));
            assert_eq!(calculate_stats(&record, today()).current_streak, 1);
        }
    }

    // ------------------------------------------------------------------------
    // Aggregate Tests
    // ------------------------------------------------------------------------

    mod aggregate_tests {
        use super::*;

        #[test]
        fn test_consistency_rate_over_thirty_days() {
            // 10 qualifying days inside the window, one outside
            let mut entries: Vec<(u64, u8)> = (0..10).map(|ago| (ago * 2, 3)).collect();
            entries.push((30, 5));
            let record = record_with(&entries);
            assert_eq!(calculate_stats(&record, today()).consistency_rate, 33);
        }

        #[test]
        fn test_consistency_rate_full_month() {
            let entries: Vec<(u64, u8)> = (0..30).map(|ago| (ago, 5)).collect();
            let record = record_with(&entries);
            assert_eq!(calculate_stats(&record, today()).consistency_rate, 100);
        }

        #[test]
        fn test_total_hours_and_days_completed() {
            let mut record = PersistedRecord::default();
            record.history.insert(days_ago(0), day(1, 90.0));
            record.history.insert(days_ago(40), day(0, 30.0));

            let stats = calculate_stats(&record, today());
            assert!((stats.total_hours - 2.0).abs() < 1e-9);
            assert_eq!(stats.days_completed, 2);
        }

        #[test]
        fn test_blocks_completed_today() {
            let record = record_with(&[(0, 4), (1, 5)]);
            assert_eq!(calculate_stats(&record, today()).blocks_completed_today, 4);
            assert_eq!(calculate_stats(&record, days_ago(1)).blocks_completed_today, 5);
        }

        #[test]
        fn test_counters_pass_through() {
            let record = PersistedRecord {
                stats: StatsCounters {
                    early_starts: 1,
                    weekly_perfect: 2,
                    focus_mode_uses: 3,
                    notes_written: 4,
                },
                ..PersistedRecord::default()
            };
            let stats = calculate_stats(&record, today());
            assert_eq!(stats.early_starts, 1);
            assert_eq!(stats.weekly_perfect, 2);
            assert_eq!(stats.focus_mode_uses, 3);
            assert_eq!(stats.notes_written, 4);
        }
    }
}

//! Daily history ledger.
//!
//! Turns the elapsed seconds of the five blocks into the `DayRecord` for a
//! date. A block counts as completed once it reaches 80% of its target; it
//! does not need to run to the full duration.

use chrono::NaiveDate;

use crate::types::{BlockId, DayRecord, History, COMPLETION_PERCENT};

/// Returns true if `elapsed_seconds` reaches the completion threshold of `block`.
pub fn is_block_completed(block: BlockId, elapsed_seconds: u64) -> bool {
    elapsed_seconds.saturating_mul(100) >= block.target_seconds() * COMPLETION_PERCENT
}

/// Builds a day record from per-block elapsed seconds.
pub fn build_day_record<I>(elapsed: I) -> DayRecord
where
    I: IntoIterator<Item = (BlockId, u64)>,
{
    let mut record = DayRecord::default();

    for (block, seconds) in elapsed {
        record.blocks.insert(block, seconds);
    }

    // Sum in block order so repeated builds give bit-identical floats
    record.total_minutes = record.blocks.values().map(|&s| s as f64 / 60.0).sum();
    record.blocks_completed = record
        .blocks
        .iter()
        .filter(|&(&block, &seconds)| is_block_completed(block, seconds))
        .count() as u8;

    record
}

/// Writes the record for `day` into `history`, replacing any earlier one.
///
/// Returns the stored record.
pub fn record_day<I>(history: &mut History, day: NaiveDate, elapsed: I) -> DayRecord
where
    I: IntoIterator<Item = (BlockId, u64)>,
{
    let record = build_day_record(elapsed);
    tracing::debug!(
        "Ledger {}: {} blocks completed, {:.1} min",
        day,
        record.blocks_completed,
        record.total_minutes
    );
    history.insert(day, record.clone());
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(n: u8) -> BlockId {
        BlockId::new(n).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_threshold_is_eighty_percent() {
        // Block 1 targets 75 min = 4500 s
        assert!(is_block_completed(block(1), 3600));
        assert!(!is_block_completed(block(1), 3599));
        // Block 5 targets 17 min = 1020 s, 80% = 816 s
        assert!(is_block_completed(block(5), 816));
        assert!(!is_block_completed(block(5), 815));
    }

    #[test]
    fn test_threshold_does_not_overflow() {
        assert!(is_block_completed(block(1), u64::MAX));

        let record = build_day_record([(block(2), u64::MAX)]);
        assert_eq!(record.blocks_completed, 1);
    }

    #[test]
    fn test_build_counts_completed_blocks_and_minutes() {
        let record = build_day_record([
            (block(1), 3600),
            (block(2), 2220),
            (block(3), 0),
            (block(4), 120),
            (block(5), 1020),
        ]);

        assert_eq!(record.blocks_completed, 3);
        assert_eq!(record.blocks.len(), 5);
        assert_eq!(record.blocks[&block(4)], 120);
        let expected = (3600.0 + 2220.0 + 0.0 + 120.0 + 1020.0) / 60.0;
        assert!((record.total_minutes - expected).abs() < 1e-9);
    }

    #[test]
    fn test_record_day_is_idempotent() {
        let mut history = History::new();
        let elapsed = [(block(1), 1234), (block(2), 4321), (block(3), 7)];

        let first = record_day(&mut history, day(), elapsed);
        let second = record_day(&mut history, day(), elapsed);

        assert_eq!(first, second);
        assert_eq!(history.len(), 1);
        assert_eq!(history[&day()], first);
    }

    #[test]
    fn test_record_day_overwrites_same_date_only() {
        let mut history = History::new();
        let yesterday = day().pred_opt().unwrap();
        record_day(&mut history, yesterday, [(block(1), 4500)]);

        record_day(&mut history, day(), [(block(1), 60)]);
        record_day(&mut history, day(), [(block(1), 120)]);

        assert_eq!(history[&yesterday].blocks[&block(1)], 4500);
        assert_eq!(history[&day()].blocks[&block(1)], 120);
    }
}

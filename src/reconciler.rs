//! State reconciler: the only place that reads and writes the record.
//!
//! All persistence follows one discipline: read the whole document, change
//! some top-level fields, write the document back with those fields
//! overlaid. Fields nobody touched (including keys this version does not
//! know about) survive every write.
//!
//! Reading is lenient. Each top-level field is decoded on its own, so a
//! corrupt `history` does not take `weeklyProgress` down with it. Timers and
//! history days are decoded entry by entry, and a write never replaces a
//! stored value the writer did not change.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::store::{Result, StateStore, StoreError};
use crate::types::{BlockId, PersistedRecord, Theme, TimerSnapshot, WeeklyProgress};

// ============================================================================
// Restoration
// ============================================================================

/// What `restore` found in the persisted record.
#[derive(Debug, Clone, PartialEq)]
pub enum Restoration {
    /// Nothing was ever saved.
    Fresh,
    /// The record was saved on an earlier (or later) calendar day.
    /// Only the weekly values carry over.
    NewDay {
        saved_day: NaiveDate,
        weekly_progress: WeeklyProgress,
        theme: Theme,
    },
    /// The record was saved today; the block timers are restored too.
    SameDay {
        timers: BTreeMap<BlockId, TimerSnapshot>,
        weekly_progress: WeeklyProgress,
        theme: Theme,
    },
}

/// The fields written by a regular save.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub timers: BTreeMap<BlockId, TimerSnapshot>,
    pub weekly_progress: WeeklyProgress,
    pub theme: Theme,
    pub last_saved: DateTime<FixedOffset>,
}

// ============================================================================
// StateReconciler
// ============================================================================

/// Reads, merges and writes the persisted record.
#[derive(Debug)]
pub struct StateReconciler<S> {
    store: S,
}

impl<S: StateStore> StateReconciler<S> {
    /// Creates a reconciler over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the record, degrading to defaults on any failure.
    pub fn load(&self) -> PersistedRecord {
        match self.read_document() {
            Ok(document) => decode_record(&document),
            Err(e) => {
                tracing::warn!("Falling back to an empty record: {}", e);
                PersistedRecord::default()
            }
        }
    }

    /// Applies `f` to the record and writes the result back.
    ///
    /// Only what `f` changed is written, down to single entries of object
    /// fields. Stored values that failed to decode stay as they are unless
    /// `f` replaces them.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written. Nothing is
    /// written when the read fails.
    pub fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PersistedRecord) -> T,
    {
        let mut document = self.read_document()?;
        let mut record = decode_record(&document);
        let before = to_fields(&record)?;
        let output = f(&mut record);

        overlay_changes(&mut document, &before, to_fields(&record)?);
        self.write_document(document)?;
        Ok(output)
    }

    /// Overlays the session fields onto the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let mut document = self.read_document()?;
        overlay(&mut document, snapshot)?;
        self.write_document(document)
    }

    /// Decides what to restore for a session starting at `now`.
    pub fn restore(&self, now: DateTime<FixedOffset>) -> Restoration {
        let record = self.load();

        let Some(last_saved) = record.last_saved else {
            return Restoration::Fresh;
        };

        let saved_day = last_saved.with_timezone(now.offset()).date_naive();
        if saved_day != now.date_naive() {
            tracing::info!("Last save was on {}, starting a new day", saved_day);
            return Restoration::NewDay {
                saved_day,
                weekly_progress: record.weekly_progress,
                theme: record.theme,
            };
        }

        Restoration::SameDay {
            timers: record.timers,
            weekly_progress: record.weekly_progress,
            theme: record.theme,
        }
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        let Some(raw) = self.store.get()? else {
            return Ok(Map::new());
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(other) => {
                tracing::warn!("Stored state is not an object ({}), ignoring it", kind(&other));
                Ok(Map::new())
            }
            Err(e) => {
                tracing::warn!("Stored state is not valid JSON, ignoring it: {}", e);
                Ok(Map::new())
            }
        }
    }

    fn write_document(&self, document: Map<String, Value>) -> Result<()> {
        let raw = serde_json::to_string(&Value::Object(document)).map_err(StoreError::Serialize)?;
        self.store.set(&raw)
    }
}

// ============================================================================
// Decoding helpers
// ============================================================================

/// Decodes a record one top-level field at a time.
///
/// `timers` and `history` are decoded one entry at a time, so a single bad
/// day only drops that day.
pub fn decode_record(document: &Map<String, Value>) -> PersistedRecord {
    PersistedRecord {
        timers: entries(document, "timers"),
        weekly_progress: field(document, "weeklyProgress"),
        theme: field(document, "theme"),
        last_saved: field(document, "lastSaved"),
        history: entries(document, "history"),
        stats: field(document, "stats"),
        unlocked_achievements: strings(document, "unlockedAchievements"),
        weekly_review: field(document, "weeklyReview"),
    }
}

fn field<T: DeserializeOwned + Default>(document: &Map<String, Value>, key: &str) -> T {
    match document.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed '{}' in stored state: {}", key, e);
            T::default()
        }),
    }
}

fn entries<K, V>(document: &Map<String, Value>, key: &str) -> BTreeMap<K, V>
where
    K: FromStr + Ord,
    V: DeserializeOwned,
{
    let map = match document.get(key) {
        None | Some(Value::Null) => return BTreeMap::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            tracing::warn!("Ignoring '{}' in stored state: expected an object, got {}", key, kind(other));
            return BTreeMap::new();
        }
    };

    map.iter()
        .filter_map(|(entry_key, value)| {
            let Ok(parsed) = entry_key.parse::<K>() else {
                tracing::warn!("Skipping unknown '{}' entry '{}'", key, entry_key);
                return None;
            };
            match serde_json::from_value::<V>(value.clone()) {
                Ok(decoded) => Some((parsed, decoded)),
                Err(e) => {
                    tracing::warn!("Skipping malformed '{}' entry '{}': {}", key, entry_key, e);
                    None
                }
            }
        })
        .collect()
}

fn strings(document: &Map<String, Value>, key: &str) -> Vec<String> {
    match document.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            tracing::warn!("Ignoring '{}' in stored state: expected an array, got {}", key, kind(other));
            Vec::new()
        }
    }
}

fn to_fields<T: Serialize>(fields: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(fields).map_err(StoreError::Serialize)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

fn overlay<T: Serialize>(document: &mut Map<String, Value>, fields: &T) -> Result<()> {
    for (key, value) in to_fields(fields)? {
        document.insert(key, value);
    }
    Ok(())
}

/// Writes the fields of `after` that differ from `before`. When both the
/// stored and the new value are objects, only the changed entries are
/// written and the other stored entries are kept.
fn overlay_changes(
    document: &mut Map<String, Value>,
    before: &Map<String, Value>,
    after: Map<String, Value>,
) {
    for (key, value) in after {
        let old = before.get(&key);
        if old == Some(&value) {
            continue;
        }

        if let (Some(Value::Object(stored)), Value::Object(changes)) = (document.get_mut(&key), &value) {
            let old_entries = old.and_then(Value::as_object);
            for (entry_key, entry) in changes {
                if old_entries.and_then(|entries| entries.get(entry_key)) != Some(entry) {
                    stored.insert(entry_key.clone(), entry.clone());
                }
            }
            continue;
        }

        document.insert(key, value);
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================

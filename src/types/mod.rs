//! Core data types for the daily execution dashboard.
//!
//! This module defines the data structures used for:
//! - Block identity and the fixed block catalog
//! - Pomodoro phases and their targets
//! - Weekly progress areas with lenient percentage parsing
//! - The persisted record and its sub-fields

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DashboardError;

// ============================================================================
// Constants
// ============================================================================

/// Number of blocks in a day.
pub const BLOCK_COUNT: usize = 5;

/// Length of a Pomodoro work phase in seconds.
pub const POMODORO_WORK_SECONDS: u64 = 25 * 60;

/// Length of a Pomodoro break phase in seconds.
pub const POMODORO_BREAK_SECONDS: u64 = 5 * 60;

/// Work phases in one full Pomodoro round before the long-break signal.
pub const POMODOROS_PER_CYCLE: u32 = 4;

/// Percentage of the target a block needs to count as completed for the day.
pub const COMPLETION_PERCENT: u64 = 80;

/// Completed blocks a day needs to count towards streaks and consistency.
pub const STREAK_MIN_BLOCKS: u8 = 3;

// ============================================================================
// BlockId
// ============================================================================

/// Identifier of one of the five daily blocks (1..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BlockId(u8);

impl BlockId {
    /// The first block of the day.
    pub const FIRST: BlockId = BlockId(1);

    /// The last block of the day.
    pub const LAST: BlockId = BlockId(BLOCK_COUNT as u8);

    /// All blocks in day order.
    pub const ALL: [BlockId; BLOCK_COUNT] = [BlockId(1), BlockId(2), BlockId(3), BlockId(4), BlockId(5)];

    /// Creates a block id, rejecting numbers outside 1..=5.
    pub fn new(number: u8) -> Result<Self, DashboardError> {
        if (1..=BLOCK_COUNT as u8).contains(&number) {
            Ok(Self(number))
        } else {
            Err(DashboardError::InvalidBlock(number.to_string()))
        }
    }

    /// Returns the block number (1..=5).
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into per-block arrays.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// Iterates over all blocks in day order.
    pub fn all() -> impl Iterator<Item = BlockId> {
        Self::ALL.into_iter()
    }

    /// Returns the block that follows this one, if any.
    pub fn next(self) -> Option<BlockId> {
        BlockId::new(self.0 + 1).ok()
    }

    /// Returns the static configuration of this block.
    pub fn config(self) -> &'static BlockConfig {
        &BLOCKS[self.index()]
    }

    /// Target duration of this block in seconds.
    pub fn target_seconds(self) -> u64 {
        u64::from(self.config().target_minutes) * 60
    }
}

impl TryFrom<u8> for BlockId {
    type Error = DashboardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BlockId::new(value)
    }
}

impl From<BlockId> for u8 {
    fn from(id: BlockId) -> Self {
        id.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlockId {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(|n| BlockId::new(n).ok())
            .ok_or_else(|| DashboardError::InvalidBlock(s.to_string()))
    }
}

// ============================================================================
// Block catalog
// ============================================================================

/// Energy level label attached to blocks and weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyLevel {
    High,
    MediumHigh,
    Medium,
    MediumLow,
    Low,
}

impl EnergyLevel {
    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            EnergyLevel::High => "Alta",
            EnergyLevel::MediumHigh => "Media-Alta",
            EnergyLevel::Medium => "Media",
            EnergyLevel::MediumLow => "Media-Baja",
            EnergyLevel::Low => "Baja",
        }
    }
}

/// Static description of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConfig {
    /// Display name
    pub name: &'static str,
    /// Target duration in minutes
    pub target_minutes: u32,
    /// Expected energy level during the block
    pub energy: EnergyLevel,
    /// Example activities
    pub examples: &'static [&'static str],
}

/// The five blocks of the day, in order.
pub static BLOCKS: [BlockConfig; BLOCK_COUNT] = [
    BlockConfig {
        name: "Bloque 1: Anclaje y Disciplina",
        target_minutes: 75,
        energy: EnergyLevel::High,
        examples: &["Gimnasio", "Ejercicio", "Rutina matutina"],
    },
    BlockConfig {
        name: "Bloque 2: La Tarea Pesada",
        target_minutes: 37,
        energy: EnergyLevel::MediumHigh,
        examples: &["CMM: Estudio", "Tareas difíciles", "Análisis profundo"],
    },
    BlockConfig {
        name: "Bloque 3: El Alto Impacto",
        target_minutes: 75,
        energy: EnergyLevel::Medium,
        examples: &["Trading: Análisis", "Proyectos importantes", "Decisiones clave"],
    },
    BlockConfig {
        name: "Bloque 4: La Creación Ligera",
        target_minutes: 52,
        energy: EnergyLevel::MediumLow,
        examples: &["IA + 3D: Creación", "Contenido", "Proyectos creativos"],
    },
    BlockConfig {
        name: "Bloque 5: El Cierre Estratégico",
        target_minutes: 17,
        energy: EnergyLevel::Low,
        examples: &["Lectura", "Reflexión", "Planificación"],
    },
];

// ============================================================================
// PomodoroPhase
// ============================================================================

/// Sub-phase of a block running in Pomodoro mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PomodoroPhase {
    /// 25-minute focused work
    #[default]
    Work,
    /// 5-minute break
    Break,
}

impl PomodoroPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            PomodoroPhase::Work => "work",
            PomodoroPhase::Break => "break",
        }
    }

    /// Seconds after which this phase ends.
    pub fn target_seconds(&self) -> u64 {
        match self {
            PomodoroPhase::Work => POMODORO_WORK_SECONDS,
            PomodoroPhase::Break => POMODORO_BREAK_SECONDS,
        }
    }
}

// ============================================================================
// Weekly progress
// ============================================================================

/// Life areas tracked in the weekly progress grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Area {
    ThreeD,
    Ia,
    Cmm,
    Trading,
    Gimnasio,
    Lectura,
}

impl Area {
    /// All areas in display order.
    pub const ALL: [Area; 6] = [
        Area::ThreeD,
        Area::Ia,
        Area::Cmm,
        Area::Trading,
        Area::Gimnasio,
        Area::Lectura,
    ];

    /// Returns the persisted key of the area.
    pub fn as_str(&self) -> &'static str {
        match self {
            Area::ThreeD => "3d",
            Area::Ia => "ia",
            Area::Cmm => "cmm",
            Area::Trading => "trading",
            Area::Gimnasio => "gimnasio",
            Area::Lectura => "lectura",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Area {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Area::ALL
            .into_iter()
            .find(|area| area.as_str() == key)
            .ok_or_else(|| DashboardError::InvalidArea(s.to_string()))
    }
}

/// Clamps an integer into a 0..=100 percentage.
pub fn clamp_percentage(value: i64) -> u8 {
    // clamp keeps the value inside u8 range
    value.clamp(0, 100) as u8
}

/// Parses user input as a percentage.
///
/// Takes the leading integer of the input (so `"42.7"` is 42) and clamps it
/// to 0..=100. Anything non-numeric becomes 0.
pub fn parse_percentage(input: &str) -> u8 {
    let trimmed = input.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse::<i64>().map_or(0, clamp_percentage)
}

fn coerce_percentage(value: &Value) -> u8 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map_or(0, clamp_percentage),
        Value::String(s) => parse_percentage(s),
        _ => 0,
    }
}

/// Percentage per area for the current week.
///
/// Reading is lenient: unknown areas are dropped and values are coerced
/// into 0..=100.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, u8>")]
pub struct WeeklyProgress(BTreeMap<Area, u8>);

impl WeeklyProgress {
    /// Returns the percentage of an area (0 when never set).
    pub fn get(&self, area: Area) -> u8 {
        self.0.get(&area).copied().unwrap_or(0)
    }

    /// Sets the percentage of an area, clamping into 0..=100.
    ///
    /// Returns the stored value.
    pub fn set(&mut self, area: Area, value: i64) -> u8 {
        let clamped = clamp_percentage(value);
        self.0.insert(area, clamped);
        clamped
    }

    /// Returns true when every area is at 100%.
    pub fn is_perfect(&self) -> bool {
        Area::ALL.iter().all(|area| self.get(*area) == 100)
    }

    /// Iterates over all areas with their percentage.
    pub fn iter(&self) -> impl Iterator<Item = (Area, u8)> + '_ {
        Area::ALL.into_iter().map(|area| (area, self.get(area)))
    }
}

impl From<BTreeMap<String, Value>> for WeeklyProgress {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let values = raw
            .iter()
            .filter_map(|(key, value)| {
                let area = key.parse::<Area>().ok()?;
                Some((area, coerce_percentage(value)))
            })
            .collect();
        Self(values)
    }
}

impl From<WeeklyProgress> for BTreeMap<String, u8> {
    fn from(progress: WeeklyProgress) -> Self {
        progress
            .0
            .into_iter()
            .map(|(area, value)| (area.as_str().to_string(), value))
            .collect()
    }
}

// ============================================================================
// Theme
// ============================================================================

/// Color theme preference. Only the value is kept here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Returns the other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Returns the string representation of the theme.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl FromStr for Theme {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(DashboardError::InvalidTheme(s.to_string())),
        }
    }
}

// ============================================================================
// Persisted record
// ============================================================================

/// Persisted snapshot of one block timer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimerSnapshot {
    /// Elapsed seconds (older records call this `seconds`)
    #[serde(alias = "seconds")]
    pub elapsed_seconds: u64,
    /// Whether the block was running when saved
    pub is_running: bool,
    /// Task text
    pub task: String,
    /// Notes text
    pub notes: String,
    /// Pomodoro mode flag
    pub pomodoro_mode: bool,
    /// Completed pomodoros in the current round
    pub pomodoro_count: u32,
    /// Current Pomodoro phase
    pub pomodoro_phase: PomodoroPhase,
}

/// Aggregate of one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DayRecord {
    /// Elapsed seconds per block
    pub blocks: BTreeMap<BlockId, u64>,
    /// Blocks that reached the completion threshold
    pub blocks_completed: u8,
    /// Total minutes across all blocks
    pub total_minutes: f64,
}

/// Date-keyed day records.
pub type History = BTreeMap<NaiveDate, DayRecord>;

/// Counters driven by user actions rather than by the history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatsCounters {
    /// Block 1 started before the early-bird hour
    pub early_starts: u32,
    /// Weeks with every area at 100%
    pub weekly_perfect: u32,
    /// Focus mode entries
    pub focus_mode_uses: u32,
    /// Notes edits
    pub notes_written: u32,
}

/// Guided weekly reflection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyReview {
    /// When the review was saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<FixedOffset>>,
    pub achievements: String,
    pub obstacles: String,
    pub learnings: String,
    pub adjustments: String,
    pub intention: String,
}

/// The whole persisted document.
///
/// Every field is optional on read; see the reconciler for the lenient
/// per-field decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedRecord {
    pub timers: BTreeMap<BlockId, TimerSnapshot>,
    pub weekly_progress: WeeklyProgress,
    pub theme: Theme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<DateTime<FixedOffset>>,
    pub history: History,
    pub stats: StatsCounters,
    pub unlocked_achievements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_review: Option<WeeklyReview>,
}

// ============================================================================
// Tests
// ============================================================================

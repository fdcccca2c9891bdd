//! Achievement catalog and evaluator.
//!
//! Achievements are a data table: each entry names one stats field and the
//! minimum value that unlocks it. Unlocking is monotonic; once an id is in
//! the persisted list it stays there and is never announced again.

use std::fmt;

use crate::stats::Stats;

// ============================================================================
// Rules
// ============================================================================

/// Stats field an achievement rule looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    DaysCompleted,
    CurrentStreak,
    BlocksCompletedToday,
    EarlyStarts,
    WeeklyPerfect,
    FocusModeUses,
    NotesWritten,
}

impl StatField {
    /// Reads the field from a stats snapshot.
    pub fn value(&self, stats: &Stats) -> u32 {
        match self {
            StatField::DaysCompleted => stats.days_completed,
            StatField::CurrentStreak => stats.current_streak,
            StatField::BlocksCompletedToday => u32::from(stats.blocks_completed_today),
            StatField::EarlyStarts => stats.early_starts,
            StatField::WeeklyPerfect => stats.weekly_perfect,
            StatField::FocusModeUses => stats.focus_mode_uses,
            StatField::NotesWritten => stats.notes_written,
        }
    }
}

/// Threshold rule: `field >= at_least`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub field: StatField,
    pub at_least: u32,
}

impl Rule {
    const fn at_least(field: StatField, at_least: u32) -> Self {
        Self { field, at_least }
    }

    /// Returns true if the stats satisfy the rule.
    pub fn is_met(&self, stats: &Stats) -> bool {
        self.field.value(stats) >= self.at_least
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Identifier of a catalog achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementId {
    FirstDay,
    WeekWarrior,
    ConsistencyKing,
    AllBlocks,
    EarlyBird,
    Perfectionist,
    FocusMaster,
    NoteTaker,
}

impl AchievementId {
    /// Returns the persisted id string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::FirstDay => "first_day",
            AchievementId::WeekWarrior => "week_warrior",
            AchievementId::ConsistencyKing => "consistency_king",
            AchievementId::AllBlocks => "all_blocks",
            AchievementId::EarlyBird => "early_bird",
            AchievementId::Perfectionist => "perfectionist",
            AchievementId::FocusMaster => "focus_master",
            AchievementId::NoteTaker => "note_taker",
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub rule: Rule,
}

/// The fixed achievement catalog.
pub static CATALOG: [Achievement; 8] = [
    Achievement {
        id: AchievementId::FirstDay,
        name: "Primer Paso",
        icon: "🎯",
        description: "Completar tu primer día",
        rule: Rule::at_least(StatField::DaysCompleted, 1),
    },
    Achievement {
        id: AchievementId::WeekWarrior,
        name: "Guerrero Semanal",
        icon: "🔥",
        description: "7 días consecutivos",
        rule: Rule::at_least(StatField::CurrentStreak, 7),
    },
    Achievement {
        id: AchievementId::ConsistencyKing,
        name: "Rey de la Consistencia",
        icon: "👑",
        description: "30 días consecutivos",
        rule: Rule::at_least(StatField::CurrentStreak, 30),
    },
    Achievement {
        id: AchievementId::AllBlocks,
        name: "Jornada Completa",
        icon: "✨",
        description: "Completar los 5 bloques en un día",
        rule: Rule::at_least(StatField::BlocksCompletedToday, 5),
    },
    Achievement {
        id: AchievementId::EarlyBird,
        name: "Madrugador",
        icon: "🌅",
        description: "Iniciar Bloque 1 antes de las 7am",
        rule: Rule::at_least(StatField::EarlyStarts, 1),
    },
    Achievement {
        id: AchievementId::Perfectionist,
        name: "Perfección Imperfecta",
        icon: "💯",
        description: "Alcanzar 100% en todas las áreas semanales",
        rule: Rule::at_least(StatField::WeeklyPerfect, 1),
    },
    Achievement {
        id: AchievementId::FocusMaster,
        name: "Maestro del Foco",
        icon: "🧘",
        description: "Usar Modo Foco 10 veces",
        rule: Rule::at_least(StatField::FocusModeUses, 10),
    },
    Achievement {
        id: AchievementId::NoteTaker,
        name: "Cronista",
        icon: "📝",
        description: "Escribir notas en 20 bloques",
        rule: Rule::at_least(StatField::NotesWritten, 20),
    },
];

/// Looks up a catalog entry by id.
pub fn find(id: AchievementId) -> &'static Achievement {
    // CATALOG is laid out in AchievementId declaration order
    &CATALOG[id as usize]
}

// ============================================================================
// Evaluation
// ============================================================================

/// Catalog entries whose rule the stats currently satisfy.
pub fn satisfied(stats: &Stats) -> impl Iterator<Item = &'static Achievement> + '_ {
    CATALOG.iter().filter(move |a| a.rule.is_met(stats))
}

/// The last `limit` satisfied entries in catalog order (the banner view).
pub fn recently_earned(stats: &Stats, limit: usize) -> Vec<&'static Achievement> {
    let earned: Vec<_> = satisfied(stats).collect();
    let skip = earned.len().saturating_sub(limit);
    earned.into_iter().skip(skip).collect()
}

/// Appends newly satisfied ids to `unlocked` and returns them.
///
/// Ids already present are left alone whatever the stats say, so each
/// achievement is reported at most once over the life of the record.
pub fn unlock_new(stats: &Stats, unlocked: &mut Vec<String>) -> Vec<AchievementId> {
    let mut fresh = Vec::new();
    for achievement in satisfied(stats) {
        let id = achievement.id.as_str();
        if !unlocked.iter().any(|u| u == id) {
            unlocked.push(id.to_string());
            fresh.push(achievement.id);
        }
    }
    fresh
}

/// Returns true if `id` is in the unlocked list.
pub fn is_unlocked(unlocked: &[String], id: AchievementId) -> bool {
    unlocked.iter().any(|u| u == id.as_str())
}

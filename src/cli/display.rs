//! Display utilities for the blockday CLI.
//!
//! This module provides formatted output for:
//! - Engine events
//! - Block status and weekly progress
//! - Statistics, achievements and the weekly plan
//! - The breathing practice

use chrono::Weekday;

use crate::achievements::{self, CATALOG};
use crate::engine::{BlockTimer, DashboardEvent};
use crate::plan::{self, WEEKLY_PLAN};
use crate::practice::BreathStep;
use crate::stats::Stats;
use crate::types::{Theme, WeeklyProgress};

/// Width of the progress bars.
const BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Prints one engine event.
    pub fn show_event(event: &DashboardEvent) {
        println!("{}", Self::event_line(event));
    }

    /// Renders an event as a single line.
    pub fn event_line(event: &DashboardEvent) -> String {
        match event {
            DashboardEvent::BlockStarted { block, early_bird } => {
                let mut line = format!("> {} iniciado", block.config().name);
                if *early_bird {
                    line.push_str(" (madrugador)");
                }
                line
            }
            DashboardEvent::BlockPaused { block } => format!("|| Bloque {} en pausa", block),
            DashboardEvent::BlockReset { block } => format!("[] Bloque {} reiniciado", block),
            DashboardEvent::BlockCompleted { block, next } => match next {
                Some(next) => format!(
                    "* ¡Bloque {} completado! Siguiente: {}",
                    block,
                    next.config().name
                ),
                None => format!("* ¡Bloque {} completado! Jornada terminada", block),
            },
            DashboardEvent::NextBlockSuggested { block } => format!(
                "? ¿Iniciar {}? Ejecuta: blockday start {}",
                block.config().name,
                block
            ),
            DashboardEvent::PomodoroModeChanged { block, enabled } => {
                if *enabled {
                    format!(
                        "Modo Pomodoro activado en el bloque {}: sesiones de 25 min con descansos de 5 min",
                        block
                    )
                } else {
                    format!("Modo Pomodoro desactivado en el bloque {}", block)
                }
            }
            DashboardEvent::PomodoroCompleted { count, .. } => format!(
                "* ¡Pomodoro {} completado! Toma un descanso de 5 minutos",
                count
            ),
            DashboardEvent::BreakFinished { next_pomodoro, .. } => {
                format!("Descanso terminado. Iniciando pomodoro {}/4", next_pomodoro)
            }
            DashboardEvent::PomodoroCycleCompleted { .. } => {
                "* ¡Ciclo Pomodoro completo! Toma un descanso largo de 15-30 min".to_string()
            }
            DashboardEvent::FocusModeEntered { block } => {
                format!("Modo Foco: {}", block.config().name)
            }
            DashboardEvent::FocusModeExited => "Modo Foco cerrado".to_string(),
            DashboardEvent::PerfectWeek => {
                "* ¡Semana perfecta! 100% en todas las áreas".to_string()
            }
            DashboardEvent::AchievementUnlocked { id } => {
                let achievement = achievements::find(*id);
                format!(
                    "{} ¡Logro desbloqueado! {}: {}",
                    achievement.icon, achievement.name, achievement.description
                )
            }
            DashboardEvent::NewDay => {
                "¡Buen día! Tus bloques se han reiniciado para hoy".to_string()
            }
            DashboardEvent::StateRestored => {
                "Se ha restaurado tu progreso del día".to_string()
            }
            DashboardEvent::WeeklyReviewReminder => {
                "Es domingo. Ejecuta `blockday review` para tu revisión semanal".to_string()
            }
            DashboardEvent::WeeklyReviewSaved => {
                "* Revisión semanal guardada".to_string()
            }
            DashboardEvent::ThemeChanged { theme } => format!("Tema: {}", theme.as_str()),
        }
    }

    /// Shows the five blocks and the weekly grid.
    pub fn show_status(timers: &[BlockTimer], progress: &WeeklyProgress, theme: Theme) {
        println!("Bloques de hoy");
        println!("─────────────────────────────");

        for timer in timers {
            let config = timer.id().config();
            let mut flags = Vec::new();
            if timer.is_running() {
                flags.push("en curso".to_string());
            }
            if timer.is_interrupted() {
                flags.push("interrumpido".to_string());
            }
            if timer.pomodoro_mode() {
                flags.push(format!(
                    "pomodoro {}/4 {}",
                    timer.pomodoro_count(),
                    timer.pomodoro_phase().as_str()
                ));
            }

            println!("{}", config.name);
            println!(
                "  {} / {}  {} {:.0}%{}",
                Self::format_clock(timer.elapsed_seconds()),
                Self::format_clock(timer.current_target_seconds()),
                Self::progress_bar(timer.progress_percent()),
                timer.progress_percent(),
                if flags.is_empty() {
                    String::new()
                } else {
                    format!("  [{}]", flags.join(", "))
                }
            );
            if !timer.task().is_empty() {
                println!("  Tarea: {}", timer.task());
            }
            if !timer.notes().is_empty() {
                println!("  Notas: {}", timer.notes());
            }
        }

        println!();
        println!("Progreso semanal");
        println!("─────────────────────────────");
        for (area, value) in progress.iter() {
            println!(
                "  {:<9} {} {:>3}%",
                area.as_str(),
                Self::progress_bar(f64::from(value)),
                value
            );
        }
        println!();
        println!("Tema: {}", theme.as_str());
    }

    /// Shows the statistics snapshot.
    pub fn show_stats(stats: &Stats) {
        println!("Estadísticas");
        println!("─────────────────────────────");
        println!("Racha actual:        {} días", stats.current_streak);
        println!("Horas totales:       {:.1}", stats.total_hours);
        println!("Consistencia (30d):  {}%", stats.consistency_rate);
        println!("Bloques hoy:         {}/5", stats.blocks_completed_today);
        println!("Días registrados:    {}", stats.days_completed);
        println!("Inicios tempranos:   {}", stats.early_starts);
        println!("Semanas perfectas:   {}", stats.weekly_perfect);
        println!("Usos de Modo Foco:   {}", stats.focus_mode_uses);
        println!("Notas escritas:      {}", stats.notes_written);
    }

    /// Shows the catalog with the unlocked entries marked.
    pub fn show_achievements(stats: &Stats, unlocked: &[String]) {
        println!("Logros");
        println!("─────────────────────────────");
        for achievement in CATALOG.iter() {
            let mark = if achievements::is_unlocked(unlocked, achievement.id) {
                "✔"
            } else {
                " "
            };
            println!(
                "[{}] {} {}: {}",
                mark, achievement.icon, achievement.name, achievement.description
            );
        }

        let recent = achievements::recently_earned(stats, 3);
        if !recent.is_empty() {
            let icons: Vec<&str> = recent.iter().map(|a| a.icon).collect();
            println!();
            println!("Recientes: {}", icons.join(" "));
        }
    }

    /// Shows today's plan followed by the week.
    pub fn show_plan(today: Weekday) {
        let day = plan::for_weekday(today);
        println!("Hoy: {} (energía {})", day.name, day.energy.label());
        println!("  Foco principal:  {}", day.primary);
        println!("  Foco secundario: {}", day.secondary);
        println!("  {}", day.guidance);
        println!();
        println!("Semana");
        println!("─────────────────────────────");
        for entry in WEEKLY_PLAN.iter() {
            let marker = if entry.weekday == today { ">" } else { " " };
            println!(
                "{} {:<10} {:<11} {} / {}",
                marker,
                entry.name,
                entry.energy.label(),
                entry.primary,
                entry.secondary
            );
        }
    }

    /// Shows a breathing instruction with the remaining time.
    pub fn show_breath_step(step: BreathStep, remaining_seconds: u32) {
        println!(
            "{:<24} Tiempo restante: {}",
            step.prompt(),
            Self::format_clock(u64::from(remaining_seconds))
        );
    }

    /// Shows the end of the breathing practice.
    pub fn show_practice_done() {
        println!("* Práctica completada. ¿Te sientes más centrado?");
    }

    /// Shows a success message.
    pub fn show_success(message: &str) {
        println!("* {}", message);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    /// Formats seconds as `MM:SS`, or `H:MM:SS` from one hour up.
    pub fn format_clock(total_seconds: u64) -> String {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{:02}:{:02}", minutes, seconds)
        }
    }

    /// Renders a percentage as a fixed-width bar.
    pub fn progress_bar(percent: f64) -> String {
        let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
        format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
    }
}

// ============================================================================
// Tests
// ============================================================================

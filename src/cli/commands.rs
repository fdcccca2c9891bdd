//! Command definitions for the blockday CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::DashboardError;
use crate::types::{Area, BlockId, Theme};

// ============================================================================
// CLI Structure
// ============================================================================

/// blockday - daily execution dashboard
#[derive(Parser, Debug)]
#[command(
    name = "blockday",
    version,
    about = "Panel de ejecución diaria: cinco bloques, Pomodoro, rachas y logros",
    long_about = "Cronometra los cinco bloques del día, lleva el historial diario,\n\
                  calcula rachas y consistencia y desbloquea logros.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// State file (default: <data dir>/blockday/state.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a block in the foreground until it completes or Ctrl-C
    Start(StartArgs),

    /// Reset one block, or all of them
    Reset(ResetArgs),

    /// Toggle Pomodoro mode on a block
    Pomodoro {
        /// Block number (1-5)
        #[arg(value_parser = parse_block)]
        block: BlockId,
    },

    /// Set the task of a block
    Task {
        /// Block number (1-5)
        #[arg(value_parser = parse_block)]
        block: BlockId,
        /// Task text (empty to clear)
        text: String,
    },

    /// Set the notes of a block
    Notes {
        /// Block number (1-5)
        #[arg(value_parser = parse_block)]
        block: BlockId,
        /// Notes text (empty to clear)
        text: String,
    },

    /// Set the weekly progress of an area (0-100)
    Progress {
        /// Area: 3d, ia, cmm, trading, gimnasio, lectura
        #[arg(value_parser = parse_area)]
        area: Area,
        /// Percentage; out-of-range values are clamped
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Switch between the dark and light theme, or pick one
    Theme {
        /// dark or light (default: the other one)
        #[arg(value_parser = parse_theme)]
        theme: Option<Theme>,
    },

    /// Save the weekly review
    Review(ReviewArgs),

    /// Show the five blocks and the weekly progress
    Status,

    /// Show streak, consistency and counters
    Stats,

    /// Show the achievement catalog
    Achievements,

    /// Show the focus plan of today and the week
    Plan,

    /// Three-minute guided breathing
    Breathe,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Block number (1-5)
    #[arg(value_parser = parse_block)]
    pub block: BlockId,

    /// Run the block in Pomodoro mode (25/5)
    #[arg(short, long)]
    pub pomodoro: bool,

    /// Open focus mode on the block
    #[arg(short, long)]
    pub focus: bool,
}

/// Arguments for the reset command
#[derive(Args, Debug, Clone)]
pub struct ResetArgs {
    /// Block number (1-5)
    #[arg(
        value_parser = parse_block,
        required_unless_present = "all",
        conflicts_with = "all"
    )]
    pub block: Option<BlockId>,

    /// Reset all five blocks
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the review command
#[derive(Args, Debug, Clone, Default)]
pub struct ReviewArgs {
    /// What went well this week
    #[arg(long, default_value = "")]
    pub achievements: String,

    /// What got in the way
    #[arg(long, default_value = "")]
    pub obstacles: String,

    /// What you learned
    #[arg(long, default_value = "")]
    pub learnings: String,

    /// What changes next week
    #[arg(long, default_value = "")]
    pub adjustments: String,

    /// Intention for next week
    #[arg(long, default_value = "")]
    pub intention: String,
}

// ============================================================================
// Value Parsers
// ============================================================================

fn parse_block(s: &str) -> Result<BlockId, String> {
    s.parse().map_err(|e: DashboardError| e.to_string())
}

fn parse_area(s: &str) -> Result<Area, String> {
    s.parse().map_err(|e: DashboardError| e.to_string())
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    s.parse().map_err(|e: DashboardError| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================

//! CLI module for blockday.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;

pub use commands::{Cli, Commands, ResetArgs, ReviewArgs, StartArgs};
pub use display::Display;

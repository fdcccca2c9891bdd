//! Input error types for the dashboard.
//!
//! These errors only appear at the parsing boundary (block numbers, area
//! keys, theme names). Once a value has been parsed into its typed form the
//! engine itself never fails for data-consistency reasons.

use thiserror::Error;

/// Errors raised when user input cannot be mapped onto the dashboard model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// Block number outside 1..=5.
    #[error("Bloque inválido: {0} (usa un número del 1 al 5)")]
    InvalidBlock(String),

    /// Unknown weekly-progress area key.
    #[error("Área desconocida: '{0}'")]
    InvalidArea(String),

    /// Unknown theme name.
    #[error("Tema desconocido: '{0}' (usa 'dark' o 'light')")]
    InvalidTheme(String),
}

impl DashboardError {
    /// Returns true if this error is about a block number.
    #[must_use]
    pub fn is_block_error(&self) -> bool {
        matches!(self, Self::InvalidBlock(_))
    }

    /// Returns a short hint for fixing the input.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidBlock(_) => "Los bloques van del 1 al 5",
            Self::InvalidArea(_) => "Áreas válidas: 3d, ia, cmm, trading, gimnasio, lectura",
            Self::InvalidTheme(_) => "Temas válidos: dark, light",
        }
    }
}

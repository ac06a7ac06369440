//! Gateway error types

use std::path::PathBuf;

use thiserror::Error;

use crate::core::patcher::PatchError;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error types
///
/// Only `Validation` and the engine variants are user-visible; patch and
/// lookup failures are swallowed by the orchestrator and downgrade the
/// request to the unpatched path.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("TARIFF_1.EXE not found in: {dir}")]
    EngineBinaryMissing { dir: PathBuf },

    #[error("DOSBox executable not found at: {path}")]
    EmulatorMissing { path: PathBuf },

    #[error("DOSBox did not finish within {seconds}s")]
    EngineTimeout { seconds: u64 },

    #[error("DOSBox ran but produced no output.txt - autoexec may have failed")]
    EngineNoOutput,

    #[error("ASM EXE failed")]
    EngineReportedError,

    #[error("Could not parse ASM output. Raw output was: {raw:?}")]
    EngineOutputUnparseable { raw: String },

    #[error("Patch failed: {0}")]
    Patch(#[from] PatchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Create a validation error with a field-specific message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for client-input errors that map to HTTP 400
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

//! Tariff gateway library
//!
//! HTTP front end for a legacy DOS tariff engine: validates requests,
//! optionally fetches a live rate from Gemini and binary-patches it into an
//! ephemeral copy of the engine's data table, runs the engine inside DOSBox
//! non-interactively, and parses its textual output back into JSON.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod web;

// Re-export main types
pub use config::Config;
pub use core::TariffService;
pub use error::{GatewayError, GatewayResult};
pub use types::{Condition, EngineOutput, RawTariffRequest, TariffRequest, TariffResponse};

// Re-export trait definitions
pub use traits::{EngineRunner, RateLookup};

// Re-export service implementations
pub use services::{DosboxRunner, GeminiRateLookup};

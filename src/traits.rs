//! Trait definitions for the gateway's external collaborators
//!
//! Both seams are mocked in tests; the real implementations live in
//! `services/`.

use std::path::Path;

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::types::{EngineOutput, TariffRequest};

/// Live tariff-rate lookup against an external language model
#[mockall::automock]
#[async_trait]
pub trait RateLookup: Send + Sync {
    /// Fetch the current tariff rate for the route as a scaled integer
    /// percentage (2500 = 25.00%), clamped to [0, 15000].
    ///
    /// `None` means the lookup is disabled or failed; callers must proceed
    /// without live data, never treat this as a request failure.
    async fn live_rate(&self, exporter: u8, importer: u8, category: u8) -> Option<u16>;
}

/// Non-interactive execution of the legacy tariff engine
#[mockall::automock]
#[async_trait]
pub trait EngineRunner: Send + Sync {
    /// Run the legacy engine found in `asm_dir` with the validated inputs
    /// and return its parsed output.
    ///
    /// Any failure here (missing binary, missing emulator, timeout,
    /// unparseable output) is fatal for the request.
    async fn run(&self, request: &TariffRequest, asm_dir: &Path) -> GatewayResult<EngineOutput>;
}

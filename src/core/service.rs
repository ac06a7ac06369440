//! Request orchestration
//!
//! Single path: Validate (done by the web layer) -> optional live-rate
//! lookup -> optional binary patch -> engine run -> response. The lookup
//! and patch steps are best-effort; only an engine failure aborts the
//! request.

use std::sync::Arc;

use tempfile::TempDir;

use crate::config::Config;
use crate::core::patcher::{self, ENGINE_EXE_NAME};
use crate::error::GatewayResult;
use crate::traits::{EngineRunner, RateLookup};
use crate::types::{TariffRequest, TariffResponse};

/// Tariff calculation service with injected collaborators
pub struct TariffService<R, E> {
    config: Arc<Config>,
    rate_lookup: Arc<R>,
    engine: Arc<E>,
}

impl<R, E> Clone for TariffService<R, E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            rate_lookup: self.rate_lookup.clone(),
            engine: self.engine.clone(),
        }
    }
}

impl<R, E> TariffService<R, E>
where
    R: RateLookup,
    E: EngineRunner,
{
    pub fn new(config: Arc<Config>, rate_lookup: Arc<R>, engine: Arc<E>) -> Self {
        Self {
            config,
            rate_lookup,
            engine,
        }
    }

    /// Calculate the tariff for a validated request
    pub async fn calculate(&self, request: TariffRequest) -> GatewayResult<TariffResponse> {
        let live_rate = self
            .rate_lookup
            .live_rate(request.exporter, request.importer, request.category)
            .await;

        let mut ai_assisted = live_rate.is_some();
        // Keeps the patched copy alive for the engine run; dropping it
        // removes the directory on every exit path.
        let mut patch_dir: Option<TempDir> = None;
        let mut asm_dir = self.config.asm_dir.clone();

        if let Some(rate) = live_rate {
            match self.patched_engine_dir(&request, rate) {
                Ok(dir) => {
                    asm_dir = dir.path().to_path_buf();
                    patch_dir = Some(dir);
                }
                Err(reason) => {
                    // Signature not found or copy failed: fall back silently
                    // to the unpatched binary.
                    tracing::warn!(%reason, "patch failed, running unpatched engine");
                    ai_assisted = false;
                }
            }
        }

        let output = self.engine.run(&request, &asm_dir).await?;
        drop(patch_dir);

        Ok(TariffResponse::new(&request, output, ai_assisted))
    }

    /// Produce a temp directory holding a patched copy of the engine binary
    fn patched_engine_dir(&self, request: &TariffRequest, rate: u16) -> GatewayResult<TempDir> {
        let src = patcher::locate_engine_exe(&self.config.asm_dir)?;
        let dir = tempfile::Builder::new().prefix("tariff_patch_").tempdir()?;
        let dest = dir.path().join(ENGINE_EXE_NAME);

        patcher::patch_tariff_exe(
            &src,
            &dest,
            request.importer,
            request.exporter,
            request.category,
            rate,
        )?;

        Ok(dir)
    }
}

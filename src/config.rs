//! Deployment configuration loaded from the environment
//!
//! All values are read once at startup and shared read-only across requests.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default wall-clock bound on one emulator run
pub const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the legacy TARIFF_1.EXE
    pub asm_dir: PathBuf,
    /// DOSBox executable, or the directory containing it
    pub dosbox_path: PathBuf,
    /// Absent credential disables the live-rate lookup entirely
    pub gemini_api_key: Option<String>,
    /// Hard timeout on the emulator process
    pub engine_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// Missing paths are not an error here; they surface as engine errors
    /// when a request actually needs them.
    pub fn from_env() -> Self {
        let asm_dir = env::var("ASM_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("asm"));
        let dosbox_path = env::var("DOSBOX_PATH")
            .map(PathBuf::from)
            .unwrap_or_default();
        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        let engine_timeout = env::var("ENGINE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_ENGINE_TIMEOUT);

        Self {
            asm_dir,
            dosbox_path,
            gemini_api_key,
            engine_timeout,
        }
    }
}

//! Non-interactive DOSBox execution of the legacy tariff engine
//!
//! Each run owns an ephemeral working directory: the EXE is copied in, an
//! autoexec config mounts the directory as drive C and redirects the
//! program's output to a file, and the emulator is launched headless under
//! a hard wall-clock timeout. The directory is removed on every exit path
//! via the `TempDir` guard.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::config::DEFAULT_ENGINE_TIMEOUT;
use crate::core::patcher::{ENGINE_EXE_NAME, locate_engine_exe};
use crate::error::{GatewayError, GatewayResult};
use crate::traits::EngineRunner;
use crate::types::{EngineOutput, TariffRequest};

/// File the autoexec script redirects the engine's stdout into
pub const OUTPUT_FILE: &str = "output.txt";

/// Sentinel the autoexec script writes when the engine exits nonzero
pub const ERROR_SENTINEL: &str = "ASM_ERROR";

/// Candidate names when `DOSBOX_PATH` points at a directory
const EMULATOR_CANDIDATES: [&str; 2] = ["DOSBox.exe", "dosbox"];

/// DOSBox-backed engine runner
pub struct DosboxRunner {
    dosbox_path: PathBuf,
    timeout: Duration,
}

impl DosboxRunner {
    /// Create a runner; `dosbox_path` is the emulator executable or its
    /// containing directory.
    pub fn new(dosbox_path: impl Into<PathBuf>) -> Self {
        Self {
            dosbox_path: dosbox_path.into(),
            timeout: DEFAULT_ENGINE_TIMEOUT,
        }
    }

    /// Override the wall-clock bound on one emulator run (fluent API)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve_emulator(&self) -> GatewayResult<PathBuf> {
        if self.dosbox_path.is_dir() {
            for name in EMULATOR_CANDIDATES {
                let candidate = self.dosbox_path.join(name);
                if candidate.exists() {
                    return Ok(candidate);
                }
            }
        } else if self.dosbox_path.is_file() {
            return Ok(self.dosbox_path.clone());
        }

        Err(GatewayError::EmulatorMissing {
            path: self.dosbox_path.clone(),
        })
    }
}

/// Render the DOSBox config whose autoexec section runs the engine
///
/// The engine reads its five inputs from the command tail (PSP:[80h]), so
/// no stdin redirection is needed; stdout goes to [`OUTPUT_FILE`] and a
/// nonzero errorlevel overwrites it with the [`ERROR_SENTINEL`].
fn render_dosbox_conf(mount_path: &Path, request: &TariffRequest) -> String {
    let invocation = format!(
        "{} {} {} {} {} {} > {}",
        ENGINE_EXE_NAME,
        request.exporter,
        request.importer,
        request.category,
        request.declared_value,
        request.condition.code(),
        OUTPUT_FILE,
    );

    [
        "[sdl]",
        "fullscreen=false",
        "output=surface",
        "autolock=false",
        "",
        "[dosbox]",
        "machine=svga_s3",
        "captures=capture",
        "memsize=16",
        "",
        "[render]",
        "frameskip=5",
        "",
        "[cpu]",
        "core=normal",
        "cputype=486_slow",
        "cycles=max",
        "",
        "[autoexec]",
        "@echo off",
        &format!("mount c \"{}\"", mount_path.display()),
        "c:",
        &invocation,
        "if errorlevel 1 goto fail",
        "goto done",
        ":fail",
        &format!("echo {} > {}", ERROR_SENTINEL, OUTPUT_FILE),
        ":done",
        "exit",
        "",
    ]
    .join("\n")
}

/// Parse the engine's captured stdout into an [`EngineOutput`]
///
/// The three labels are matched case-insensitively. The sentinel, or any
/// unmatched line, is fatal and the raw text travels in the error for
/// diagnosis.
pub fn parse_engine_output(raw: &str) -> GatewayResult<EngineOutput> {
    if raw.contains(ERROR_SENTINEL) {
        return Err(GatewayError::EngineReportedError);
    }

    let base_re = Regex::new(r"(?i)Base\s+Tariff\s*:\s*(\d+\.\d+%)").unwrap();
    let effective_re = Regex::new(r"(?i)Effective\s+Tariff\s*:\s*(\d+\.\d+%)").unwrap();
    let duty_re = Regex::new(r"(?i)Duty\s+Payable\s*:\s*(\d+)").unwrap();

    let base = base_re.captures(raw).map(|c| c[1].to_string());
    let effective = effective_re.captures(raw).map(|c| c[1].to_string());
    let duty = duty_re
        .captures(raw)
        .and_then(|c| c[1].parse::<u64>().ok());

    match (base, effective, duty) {
        (Some(base_tariff), Some(effective_tariff), Some(duty_payable)) => Ok(EngineOutput {
            base_tariff,
            effective_tariff,
            duty_payable,
        }),
        _ => Err(GatewayError::EngineOutputUnparseable {
            raw: raw.to_string(),
        }),
    }
}

#[async_trait]
impl EngineRunner for DosboxRunner {
    async fn run(&self, request: &TariffRequest, asm_dir: &Path) -> GatewayResult<EngineOutput> {
        let exe_src = locate_engine_exe(asm_dir)?;
        let emulator = self.resolve_emulator()?;

        // Dropped on every exit path, including timeout.
        let workdir = tempfile::Builder::new().prefix("tariff_").tempdir()?;
        let work = workdir.path();

        tokio::fs::copy(&exe_src, work.join(ENGINE_EXE_NAME)).await?;

        // Interactive fallback inputs, one value per CRLF line.
        let input = format!(
            "{}\r\n{}\r\n{}\r\n{}\r\n{}\r\n",
            request.exporter,
            request.importer,
            request.category,
            request.declared_value,
            request.condition.code(),
        );
        tokio::fs::write(work.join("input.txt"), input).await?;

        let conf_path = work.join("dosbox.cfg");
        tokio::fs::write(&conf_path, render_dosbox_conf(work, request)).await?;

        let mut child = Command::new(&emulator)
            .arg("-conf")
            .arg(&conf_path)
            .arg("-noconsole")
            .arg("-exit")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => {
                // DOSBox's own exit status is not meaningful; failures are
                // reported through the sentinel in output.txt.
                let _ = status?;
            }
            Err(_) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(GatewayError::EngineTimeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        }

        // The DOS program writes CP437, so the capture may carry bytes that
        // are not valid UTF-8; decode lossily rather than failing the read.
        let bytes = tokio::fs::read(work.join(OUTPUT_FILE))
            .await
            .map_err(|_| GatewayError::EngineNoOutput)?;
        let raw = String::from_utf8_lossy(&bytes);

        parse_engine_output(&raw)
    }
}

//! Integration tests for the DOSBox runner using a stub emulator
//!
//! The stub is a shell script standing in for DOSBox: it receives the same
//! `-conf <path> -noconsole -exit` arguments, recovers the mounted working
//! directory from the autoexec config, and writes whatever output the
//! scenario calls for.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use tariff_gateway::services::engine_runner::DosboxRunner;
use tariff_gateway::traits::EngineRunner;
use tariff_gateway::types::{Condition, TariffRequest};
use tariff_gateway::GatewayError;

/// Shell preamble that extracts the mount path from the generated config
const FIND_WORKDIR: &str = r#"#!/bin/sh
conf="$2"
dir=$(sed -n 's/^mount c "\(.*\)"$/\1/p' "$conf")
"#;

fn request() -> TariffRequest {
    TariffRequest {
        exporter: 1,
        importer: 2,
        category: 3,
        declared_value: 100_000,
        condition: Condition::Normal,
    }
}

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("dosbox");
    fs::write(&path, body).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn asm_dir_with_exe() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("TARIFF_1.EXE"), b"MZ stub").unwrap();
    dir
}

#[tokio::test]
async fn stub_emulator_output_is_parsed() {
    let asm_dir = asm_dir_with_exe();
    let stub_dir = TempDir::new().unwrap();
    let script = write_script(
        stub_dir.path(),
        &format!(
            "{FIND_WORKDIR}printf 'Base Tariff: 22.00%%\\r\\nEffective Tariff: 17.00%%\\r\\nDuty Payable: 22000\\r\\n' > \"$dir/output.txt\"\n"
        ),
    );

    let runner = DosboxRunner::new(script);
    let output = runner.run(&request(), asm_dir.path()).await.unwrap();

    assert_eq!(output.base_tariff, "22.00%");
    assert_eq!(output.effective_tariff, "17.00%");
    assert_eq!(output.duty_payable, 22_000);
}

#[tokio::test]
async fn code_page_bytes_in_output_do_not_mask_the_result() {
    // A CP437 build of the engine can emit bytes that are not valid UTF-8;
    // the run must still parse the three result lines around them.
    let asm_dir = asm_dir_with_exe();
    let stub_dir = TempDir::new().unwrap();
    let script = write_script(
        stub_dir.path(),
        &format!(
            "{FIND_WORKDIR}printf 'Base Tariff: 22.00%%\\r\\nEffective Tariff: 17.00%%\\r\\nDuty Payable: 22000\\r\\n\\377\\r\\n' > \"$dir/output.txt\"\n"
        ),
    );

    let runner = DosboxRunner::new(script);
    let output = runner.run(&request(), asm_dir.path()).await.unwrap();

    assert_eq!(output.base_tariff, "22.00%");
    assert_eq!(output.duty_payable, 22_000);
}

#[tokio::test]
async fn hung_emulator_hits_the_timeout() {
    let asm_dir = asm_dir_with_exe();
    let stub_dir = TempDir::new().unwrap();
    let script = write_script(stub_dir.path(), "#!/bin/sh\nsleep 30\n");

    let runner = DosboxRunner::new(script).with_timeout(Duration::from_millis(300));
    let err = runner.run(&request(), asm_dir.path()).await.unwrap_err();

    assert!(matches!(err, GatewayError::EngineTimeout { .. }));
}

#[tokio::test]
async fn emulator_without_output_is_an_engine_error() {
    let asm_dir = asm_dir_with_exe();
    let stub_dir = TempDir::new().unwrap();
    let script = write_script(stub_dir.path(), "#!/bin/sh\nexit 0\n");

    let runner = DosboxRunner::new(script);
    let err = runner.run(&request(), asm_dir.path()).await.unwrap_err();

    assert!(matches!(err, GatewayError::EngineNoOutput));
}

#[tokio::test]
async fn sentinel_marker_is_an_engine_error() {
    let asm_dir = asm_dir_with_exe();
    let stub_dir = TempDir::new().unwrap();
    let script = write_script(
        stub_dir.path(),
        &format!("{FIND_WORKDIR}printf 'ASM_ERROR \\r\\n' > \"$dir/output.txt\"\n"),
    );

    let runner = DosboxRunner::new(script);
    let err = runner.run(&request(), asm_dir.path()).await.unwrap_err();

    assert!(matches!(err, GatewayError::EngineReportedError));
}

#[tokio::test]
async fn malformed_output_carries_the_raw_text() {
    let asm_dir = asm_dir_with_exe();
    let stub_dir = TempDir::new().unwrap();
    let script = write_script(
        stub_dir.path(),
        &format!("{FIND_WORKDIR}printf 'Base Tariff: 22.00%%\\r\\n' > \"$dir/output.txt\"\n"),
    );

    let runner = DosboxRunner::new(script);
    let err = runner.run(&request(), asm_dir.path()).await.unwrap_err();

    match err {
        GatewayError::EngineOutputUnparseable { raw } => {
            assert!(raw.contains("Base Tariff: 22.00%"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_engine_binary_fails_before_spawning() {
    let empty_asm_dir = TempDir::new().unwrap();
    let stub_dir = TempDir::new().unwrap();
    let script = write_script(stub_dir.path(), "#!/bin/sh\nexit 0\n");

    let runner = DosboxRunner::new(script);
    let err = runner.run(&request(), empty_asm_dir.path()).await.unwrap_err();

    assert!(matches!(err, GatewayError::EngineBinaryMissing { .. }));
}

#[tokio::test]
async fn missing_emulator_fails_before_spawning() {
    let asm_dir = asm_dir_with_exe();

    let runner = DosboxRunner::new("/nonexistent/DOSBox.exe");
    let err = runner.run(&request(), asm_dir.path()).await.unwrap_err();

    assert!(matches!(err, GatewayError::EmulatorMissing { .. }));
}

//! Binary patching of the legacy engine's embedded tariff table
//!
//! The compiled EXE carries a row-major 3D table of 16-bit little-endian
//! words indexed [importer-1][exporter-1][category-1]. The table's first
//! three words are fixed sentinels, which gives us a byte signature to
//! locate it without any structured format. The stride constants below are
//! load-bearing: a wrong offset silently corrupts an unrelated tariff cell
//! instead of failing, so they must never be derived ad hoc.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{GatewayError, GatewayResult};

/// Canonical name of the legacy engine binary
pub const ENGINE_EXE_NAME: &str = "TARIFF_1.EXE";

/// First three words of TARIFF_TABLE in the compiled EXE:
/// 2500 (0x09C4), 2400 (0x0960), 2300 (0x08FC), all little-endian.
pub const TABLE_SIGNATURE: [u8; 6] = [0xC4, 0x09, 0x60, 0x09, 0xFC, 0x08];

/// Entries to skip per importer step: 10 exporters x 8 categories
pub const IMPORTER_STRIDE: usize = 80;
/// Entries to skip per exporter step: 8 categories
pub const EXPORTER_STRIDE: usize = 8;
/// Each table entry is one 16-bit little-endian word
pub const ENTRY_BYTES: usize = 2;

/// Patch operation failures
///
/// None of these are user-visible; the orchestrator falls back to the
/// unpatched binary on any of them.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("tariff table signature not found in source binary")]
    SignatureNotFound,

    #[error("tariff table extends past the end of the binary")]
    TableOutOfBounds,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte offset of the (importer, exporter, category) entry relative to the
/// start of the table. Indices are the validated 1-based wire values.
pub fn table_entry_offset(importer: u8, exporter: u8, category: u8) -> usize {
    ((importer as usize - 1) * IMPORTER_STRIDE
        + (exporter as usize - 1) * EXPORTER_STRIDE
        + (category as usize - 1))
        * ENTRY_BYTES
}

fn find_signature(data: &[u8]) -> Option<usize> {
    data.windows(TABLE_SIGNATURE.len())
        .position(|window| window == TABLE_SIGNATURE)
}

/// Copy `src` to `dest` with exactly one tariff word overwritten
///
/// Locates the table by its byte signature, overwrites the 2-byte entry for
/// (importer, exporter, category) with `tariff_value`, and leaves every
/// other byte unchanged. On failure `dest` is not written.
pub fn patch_tariff_exe(
    src: &Path,
    dest: &Path,
    importer: u8,
    exporter: u8,
    category: u8,
    tariff_value: u16,
) -> Result<(), PatchError> {
    let mut data = fs::read(src)?;

    let table_start = find_signature(&data).ok_or(PatchError::SignatureNotFound)?;
    let offset = table_start + table_entry_offset(importer, exporter, category);
    if offset + ENTRY_BYTES > data.len() {
        return Err(PatchError::TableOutOfBounds);
    }

    data[offset..offset + ENTRY_BYTES].copy_from_slice(&tariff_value.to_le_bytes());
    fs::write(dest, &data)?;
    Ok(())
}

/// Locate the engine binary in `dir` by case-insensitive name match
pub fn locate_engine_exe(dir: &Path) -> GatewayResult<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|_| GatewayError::EngineBinaryMissing {
        dir: dir.to_path_buf(),
    })?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().to_uppercase() == ENGINE_EXE_NAME {
            return Ok(entry.path());
        }
    }

    Err(GatewayError::EngineBinaryMissing {
        dir: dir.to_path_buf(),
    })
}

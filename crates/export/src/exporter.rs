use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use scheduler::{CancellationToken, Deadline, WorkerPool};

use crate::error::{ExportError, Result};

const CHUNK_SIZE: usize = 4096;
const NORMALIZED_VERSION: u32 = 0x0000_008D;
const VERSION_FIELD_OFFSET: usize = 0x08;

/// One asset's location, as decoded by the archive header reader. Exporting
/// only needs the two offset/size fields, so this mirrors a slice of
/// `archive::AssetHeader` rather than depending on the whole type.
#[derive(Debug, Clone, Copy)]
pub struct BankLocation {
    pub data_offset: u64,
    pub data_size: u32,
}

/// Re-emits one embedded soundbank as a standalone `.bnk` file, normalizing
/// its `BKHD` engine-version field so downstream tooling accepts it.
pub fn export_bank(archive_path: &Path, location: BankLocation, output_path: &Path) -> Result<()> {
    let payload_size = location
        .data_size
        .checked_sub(16)
        .ok_or(ExportError::PayloadTooSmall {
            size: location.data_size as u64,
        })? as u64;
    if payload_size < 12 {
        return Err(ExportError::PayloadTooSmall { size: payload_size });
    }

    let mut input = File::open(archive_path)?;
    input.seek(SeekFrom::Start(location.data_offset + 16))?;

    let mut header = [0u8; 12];
    input.read_exact(&mut header)?;
    let patched = NORMALIZED_VERSION.to_le_bytes();
    header[VERSION_FIELD_OFFSET..VERSION_FIELD_OFFSET + 4].copy_from_slice(&patched);

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let output = File::create(output_path)?;
    let mut writer = BufWriter::new(output);
    writer.write_all(&header)?;

    let mut remaining = payload_size - 12;
    let mut buf = [0u8; CHUNK_SIZE];
    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        input.read_exact(&mut buf[..want])?;
        writer.write_all(&buf[..want])?;
        remaining -= want as u64;
    }
    writer.flush()?;

    log::debug!("{}: wrote {} bytes", output_path.display(), payload_size);
    Ok(())
}

/// Exports many banks concurrently, bounded by `pool`'s capacity — the same
/// worker-pool primitive the per-archive pipeline uses, with a bank-writer
/// cap instead of an archive-parse cap.
pub fn export_many(
    pool: &WorkerPool,
    token: &CancellationToken,
    deadline: Option<&Deadline>,
    jobs: Vec<(PathBuf, BankLocation, PathBuf)>,
) -> scheduler::Result<Vec<()>> {
    pool.run(jobs, token, deadline, |(archive_path, location, output_path)| {
        export_bank(&archive_path, location, &output_path)
            .map_err(|e| scheduler::SchedulerError::WorkerFailed(e.to_string()))
    })
}

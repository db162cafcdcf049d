use std::collections::HashMap;

use crate::error::{ArchiveError, Result};
use crate::header::AssetHeader;
use crate::reader::ByteReader;

/// A soundbank payload located within one archive, keyed by `file_id`.
/// `path_name` is filled in by the dependency join in [`extract_banks`];
/// it is empty until then.
#[derive(Debug, Clone)]
pub struct RawBank {
    pub file_id: u64,
    pub data_offset: u64,
    pub data_size: u32,
    pub path_name: String,
    pub raw_bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct DepRecord {
    #[allow(dead_code)]
    file_id: u64,
    path: String,
}

fn normalize_path(raw: &[u8]) -> String {
    let trimmed: Vec<u8> = raw.iter().copied().filter(|&b| b != 0).collect();
    String::from_utf8_lossy(&trimmed).replace('/', "_")
}

/// Two-pass soundbank/dependency join, per the archive's payload region.
/// `reader` must support absolute seeks to arbitrary payload offsets (a
/// `StreamReader` over the archive file, typically).
pub fn extract_banks(
    reader: &mut impl ByteReader,
    archive_id: &str,
    headers: &[AssetHeader],
    soundbank_indices: &[u32],
    dependency_indices: &[u32],
) -> Result<HashMap<u64, RawBank>> {
    let mut banks: HashMap<u64, RawBank> = HashMap::with_capacity(soundbank_indices.len());
    let mut deps: HashMap<u64, DepRecord> = HashMap::with_capacity(dependency_indices.len());

    for &idx in soundbank_indices {
        let header = &headers[idx as usize];
        reader.abs_seek(header.data_offset + 16)?;
        let payload_size = header
            .data_size
            .checked_sub(16)
            .ok_or_else(|| ArchiveError::InvalidSeek {
                target: header.data_offset as i64,
                len: header.data_size as u64,
            })?;
        let raw_bytes = reader.read_exact(payload_size as usize)?;
        if banks
            .insert(
                header.file_id,
                RawBank {
                    file_id: header.file_id,
                    data_offset: header.data_offset,
                    data_size: payload_size,
                    path_name: String::new(),
                    raw_bytes,
                },
            )
            .is_some()
        {
            return Err(ArchiveError::DuplicateKey {
                archive_id: archive_id.to_string(),
                key: header.file_id.to_string(),
            });
        }
    }

    for &idx in dependency_indices {
        let header = &headers[idx as usize];
        reader.abs_seek(header.data_offset + 4)?;
        let len = reader.read_u32()?;
        let raw = reader.read_exact(len as usize)?;
        let path = normalize_path(&raw);
        if deps
            .insert(
                header.file_id,
                DepRecord {
                    file_id: header.file_id,
                    path,
                },
            )
            .is_some()
        {
            return Err(ArchiveError::DuplicateKey {
                archive_id: archive_id.to_string(),
                key: header.file_id.to_string(),
            });
        }
    }

    for (id, bank) in banks.iter_mut() {
        if let Some(dep) = deps.get(id) {
            bank.path_name = dep.path.clone();
        }
    }

    Ok(banks)
}

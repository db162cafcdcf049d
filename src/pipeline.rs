use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use archive::{
    decode_archive_header, decode_asset_headers_parallel, extract_banks, list_archives,
    AssetClass, AssetHeader, InPlaceReader, StreamReader,
};
use dedup::{BankResult, Deduper, ParseResult};
use export::{export_bank, BankLocation};
use hirc::parse_hirc;
use scheduler::{BatchDispatcher, CancellationToken, Deadline, WorkerPool};
use sink::{ArchiveRow, AssetRow, HierarchyRow, Sink, SoundRow, SoundbankRow};

use crate::config::Config;
use crate::selector::Selector;

/// Directory reads are chunked to this size before each batch is handed to
/// the `BatchDispatcher`, per the producer-consumer enumeration pattern.
const DIRECTORY_BATCH_SIZE: usize = 1024;

fn archive_id_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn date_modified_of(path: &Path) -> i64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn open_stream(path: &Path) -> Result<StreamReader<File>> {
    let len = std::fs::metadata(path)?.len();
    let file = File::open(path)?;
    Ok(StreamReader::new(file, len)?)
}

struct WorkerOutput {
    archive_id: String,
    date_modified: i64,
    asset_headers: Vec<AssetHeader>,
    parse_result: ParseResult,
}

fn parse_archive(path: &Path, with_bodies: bool, workers: usize) -> anyhow::Result<WorkerOutput> {
    let archive_id = archive_id_of(path);
    let mut reader = open_stream(path)?;
    let header = decode_archive_header(&mut reader)?;
    let decoded = decode_asset_headers_parallel(&mut reader, header.num_files, workers)?;

    let mut banks = Vec::new();
    if with_bodies {
        let raw_banks = extract_banks(
            &mut reader,
            &archive_id,
            &decoded.headers,
            &decoded.soundbank_indices,
            &decoded.dependency_indices,
        )?;
        for (file_id, bank) in raw_banks {
            let hirc = {
                let mut ir = InPlaceReader::new(&bank.raw_bytes);
                parse_hirc(&mut ir).unwrap_or_else(|e| {
                    warn!("{archive_id}/{file_id}: dropping bank, {e}");
                    None
                })
            };
            let path_name = if bank.path_name.is_empty() {
                format!("bank_{file_id}_{archive_id}")
            } else {
                bank.path_name
            };
            banks.push(BankResult {
                file_id,
                path_name,
                hirc,
            });
        }
    }

    Ok(WorkerOutput {
        archive_id,
        date_modified: date_modified_of(path),
        asset_headers: decoded.headers,
        parse_result: ParseResult { banks },
    })
}

fn run_over_archives<T: Send + 'static>(
    cfg: &Config,
    token: &CancellationToken,
    deadline_secs: u64,
    label: &str,
    work: impl Fn(PathBuf) -> scheduler::Result<Option<T>> + Send + Sync + 'static,
) -> Result<Vec<T>> {
    let paths = list_archives(&cfg.data_dir).context("enumerating data directory")?;
    info!("{label}: {} candidate archives", paths.len());

    let pool = WorkerPool::new(cfg.workers.max(1));
    let deadline = Deadline::after(Duration::from_secs(deadline_secs));
    let results = pool.run(paths, token, Some(&deadline), work)?;
    Ok(results.into_iter().flatten().collect())
}

fn build_asset_rows(archive_id: &str, headers: &[AssetHeader]) -> Vec<AssetRow> {
    headers
        .iter()
        .map(|h| AssetRow {
            archive_id: archive_id.to_string(),
            file_id: h.file_id,
            type_id: h.type_id,
            data_offset: h.data_offset,
            stream_offset: h.stream_offset,
            gpu_offset: h.gpu_offset,
            data_size: h.data_size,
            stream_size: h.stream_size,
            gpu_size: h.gpu_size,
            index: h.index,
        })
        .collect()
}

/// Expands the Deduper's arena into the denormalized row sets the sink
/// writes: each object/sound row is repeated once per (archive, bank) pair
/// that actually referenced it.
fn build_rows(
    deduper: &Deduper,
) -> (Vec<SoundbankRow>, Vec<HierarchyRow>, Vec<SoundRow>) {
    let mut soundbank_rows = Vec::new();
    for bank in deduper.banks() {
        for archive_id in &bank.referrers {
            soundbank_rows.push(SoundbankRow {
                archive_id: archive_id.clone(),
                file_id: bank.file_id,
                path_name: bank.path_name.clone(),
                readable_name: String::new(),
                categories: String::new(),
            });
        }
    }

    let banks_by_key: std::collections::HashMap<_, _> =
        deduper.banks().map(|b| (b.key(), b)).collect();

    let mut hierarchy_rows = Vec::new();
    let mut sound_rows = Vec::new();
    let sounds: std::collections::HashMap<_, _> = deduper.sounds().collect();

    for object in deduper.objects() {
        for bank_key in &object.referenced_by {
            let Some(bank) = banks_by_key.get(bank_key) else {
                continue;
            };
            for archive_id in &bank.referrers {
                hierarchy_rows.push(HierarchyRow {
                    archive_id: archive_id.clone(),
                    file_id: bank.file_id,
                    object_id: object.id,
                    kind: object.kind.as_tag(),
                    parent_id: object.parent,
                    label: String::new(),
                    tags: String::new(),
                    description: String::new(),
                });
                if let Some(sources) = sounds.get(&object.id) {
                    for source_id in sources.iter() {
                        sound_rows.push(SoundRow {
                            archive_id: archive_id.clone(),
                            file_id: bank.file_id,
                            object_id: object.id,
                            source_id: *source_id,
                        });
                    }
                }
            }
        }
    }

    (soundbank_rows, hierarchy_rows, sound_rows)
}

/// Validates `path` as a well-formed archive and reads just enough to build
/// its archive-table row. Unlike [`parse_archive`], this never touches the
/// asset header table: directory indexing only needs the archive to exist
/// and decode cleanly, not its contents.
fn decode_archive_row(path: &Path) -> anyhow::Result<ArchiveRow> {
    let mut reader = open_stream(path)?;
    decode_archive_header(&mut reader)?;
    Ok(ArchiveRow {
        archive_id: archive_id_of(path),
        tags: String::new(),
        categories: String::new(),
        date_modified: date_modified_of(path),
    })
}

pub fn insert_archive(
    cfg: &Config,
    sink: &mut dyn Sink,
    token: &CancellationToken,
    deadline_secs: Option<u64>,
) -> Result<()> {
    let deadline_secs = deadline_secs.unwrap_or(cfg.insert_deadline_secs);
    let paths = list_archives(&cfg.data_dir).context("enumerating data directory")?;
    info!("insert_archive: {} candidate archives", paths.len());

    let batches: Vec<Vec<PathBuf>> = paths
        .chunks(DIRECTORY_BATCH_SIZE)
        .map(|c| c.to_vec())
        .collect();

    let dispatcher = BatchDispatcher::new(cfg.workers.max(1));
    let deadline = Deadline::after(Duration::from_secs(deadline_secs));
    let batched_rows = dispatcher.run(batches, token, Some(&deadline), |batch| {
        let mut rows = Vec::with_capacity(batch.len());
        for path in batch {
            match decode_archive_row(&path) {
                Ok(row) => rows.push(row),
                Err(e) => warn!("{}: skipping archive, {e}", path.display()),
            }
        }
        Ok(rows)
    })?;

    let rows: Vec<ArchiveRow> = batched_rows.into_iter().flatten().collect();
    sink.replace_archives(&rows)?;
    info!("insert_archive: wrote {} archive rows", rows.len());
    Ok(())
}

pub fn generate(
    cfg: &Config,
    sink: &mut dyn Sink,
    token: &CancellationToken,
    deadline_secs: Option<u64>,
) -> Result<()> {
    let deadline_secs = deadline_secs.unwrap_or(cfg.generate_deadline_secs);
    let workers = cfg.workers.max(1);
    let outputs = run_over_archives(cfg, token, deadline_secs, "generate", move |path| {
        match parse_archive(&path, true, workers) {
            Ok(out) => Ok(Some(out)),
            Err(e) => {
                warn!("{}: skipping archive, {e}", path.display());
                Ok(None)
            }
        }
    })?;

    let mut archive_rows = Vec::with_capacity(outputs.len());
    let mut asset_rows = Vec::new();
    let mut deduper = Deduper::new();

    for output in outputs {
        archive_rows.push(ArchiveRow {
            archive_id: output.archive_id.clone(),
            tags: String::new(),
            categories: String::new(),
            date_modified: output.date_modified,
        });
        asset_rows.extend(build_asset_rows(&output.archive_id, &output.asset_headers));
        deduper.merge(&output.archive_id, &output.parse_result);
    }

    for conflict in deduper.conflicts() {
        warn!(
            "hierarchy object {} conflict: kept ({:?},{:?}), saw ({:?},{:?})",
            conflict.object_id,
            conflict.first_parent,
            conflict.first_kind,
            conflict.seen_parent,
            conflict.seen_kind
        );
    }

    let (soundbank_rows, hierarchy_rows, sound_rows) = build_rows(&deduper);

    sink.replace_all(&archive_rows, &asset_rows, &soundbank_rows, &hierarchy_rows, &sound_rows)?;
    info!(
        "generate: {} archives, {} soundbanks, {} hierarchy objects, {} sounds",
        archive_rows.len(),
        soundbank_rows.len(),
        hierarchy_rows.len(),
        sound_rows.len()
    );
    Ok(())
}

fn soundbank_export_jobs(
    path: &Path,
    dest_dir: &Path,
    workers: usize,
) -> anyhow::Result<Vec<(PathBuf, BankLocation, PathBuf)>> {
    let archive_id = archive_id_of(path);
    let mut reader = open_stream(path)?;
    let header = decode_archive_header(&mut reader)?;
    let decoded = decode_asset_headers_parallel(&mut reader, header.num_files, workers)?;

    let mut jobs = Vec::new();
    for &idx in &decoded.soundbank_indices {
        let asset = &decoded.headers[idx as usize];
        debug_assert_eq!(asset.class(), AssetClass::SoundBank);
        let output = dest_dir
            .join(&archive_id)
            .join(format!("bank_{}.bnk", asset.file_id));
        jobs.push((
            path.to_path_buf(),
            BankLocation {
                data_offset: asset.data_offset,
                data_size: asset.data_size,
            },
            output,
        ));
    }
    Ok(jobs)
}

pub fn extract_all_soundbank(
    cfg: &Config,
    token: &CancellationToken,
    deadline_secs: Option<u64>,
) -> Result<()> {
    let deadline_secs = deadline_secs.unwrap_or(cfg.extract_deadline_secs);
    let paths = list_archives(&cfg.data_dir)?;

    let mut jobs = Vec::new();
    for path in &paths {
        match soundbank_export_jobs(path, &cfg.dest_dir, cfg.workers.max(1)) {
            Ok(mut js) => jobs.append(&mut js),
            Err(e) => warn!("{}: skipping archive, {e}", path.display()),
        }
    }

    let pool = WorkerPool::new(cfg.workers.max(1));
    let deadline = Deadline::after(Duration::from_secs(deadline_secs));
    export::export_many(&pool, token, Some(&deadline), jobs)?;
    info!("extract_all_soundbank: export pass complete");
    Ok(())
}

pub fn extract_soundbank(
    cfg: &Config,
    token: &CancellationToken,
    deadline_secs: Option<u64>,
    selector: &mut dyn Selector,
) -> Result<()> {
    let deadline_secs = deadline_secs.unwrap_or(cfg.extract_deadline_secs);
    let paths = list_archives(&cfg.data_dir)?;
    let names: Vec<String> = paths.iter().map(|p| archive_id_of(p)).collect();
    if names.is_empty() {
        anyhow::bail!("no candidate archives found under {}", cfg.data_dir.display());
    }

    let index = selector.select(&names)?;
    let chosen = &paths[index];

    let jobs = soundbank_export_jobs(chosen, &cfg.dest_dir, cfg.workers.max(1))?;
    let pool = WorkerPool::new(cfg.workers.max(1));
    let deadline = Deadline::after(Duration::from_secs(deadline_secs));
    export::export_many(&pool, token, Some(&deadline), jobs)?;
    info!("extract_soundbank: exported {}", chosen.display());
    Ok(())
}

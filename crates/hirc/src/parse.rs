use archive::ByteReader;

use crate::error::{HircError, Result};
use crate::kinds::HircKind;
use crate::records::{decode_bank_source_data, decode_base_param, Hirc, HierarchyEntry, SoundEntry};

const HIRC_TAG: [u8; 4] = *b"HIRC";

fn read_tag(r: &mut impl ByteReader) -> Result<[u8; 4]> {
    let bytes = r.read_exact(4)?;
    Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Walks the chunked bank body starting at the reader's current position,
/// decodes the `HIRC` chunk if present, and returns `None` if the stream
/// is exhausted before one is found.
pub fn parse_hirc(r: &mut impl ByteReader) -> Result<Option<Hirc>> {
    loop {
        let tag = match read_tag(r) {
            Ok(t) => t,
            Err(HircError::Archive(archive::ArchiveError::ShortBuffer { .. })) => return Ok(None),
            Err(e) => return Err(e),
        };
        let size = r.read_u32()?;

        if tag != HIRC_TAG {
            log::trace!("skipping chunk {:?} ({size} bytes)", String::from_utf8_lossy(&tag));
            r.rel_seek(size as i64)?;
            continue;
        }

        let end = r.tell() + size as u64;
        let hirc = decode_hirc_body(r, tag, end)?;
        return Ok(Some(hirc));
    }
}

fn decode_hirc_body(r: &mut impl ByteReader, header_tag: [u8; 4], end: u64) -> Result<Hirc> {
    let n = r.read_u32()?;
    let mut objects = Vec::with_capacity(n as usize);
    let mut sounds = Vec::with_capacity(n as usize / 2);

    for _ in 0..n {
        let kind_tag = r.read_u8()?;
        let size = r.read_u32()?;
        let record_end = r.tell() + size as u64;
        let kind = HircKind::from_tag(kind_tag);

        decode_record(r, kind, record_end, &mut objects, &mut sounds)?;

        r.abs_seek(record_end)?;
    }

    if r.tell() != end {
        return Err(HircError::TruncatedRecord {
            expected: end,
            found: r.tell(),
        });
    }

    Ok(Hirc {
        header: u32::from_le_bytes(header_tag),
        objects,
        sounds,
    })
}

fn decode_record(
    r: &mut impl ByteReader,
    kind: HircKind,
    record_end: u64,
    objects: &mut Vec<HierarchyEntry>,
    sounds: &mut Vec<SoundEntry>,
) -> Result<()> {
    use HircKind::*;

    match kind {
        Sound => {
            let id = r.read_u32()?;
            let draft = decode_bank_source_data(r)?;
            sounds.push(SoundEntry {
                object_id: id,
                source_id: draft.source_id,
            });
            let parent = decode_base_param(r)?;
            objects.push(HierarchyEntry {
                id,
                parent: Some(parent),
                kind,
            });
        }
        MusicTrack => {
            let id = r.read_u32()?;
            r.rel_seek(1)?; // flag byte

            let num_sources = r.read_u32()?;
            for _ in 0..num_sources {
                let draft = decode_bank_source_data(r)?;
                sounds.push(SoundEntry {
                    object_id: id,
                    source_id: draft.source_id,
                });
            }

            let num_playlist = r.read_u32()?;
            r.rel_seek((num_playlist as i64) * (3 * 4 + 4 * 8))?;
            if num_playlist > 0 {
                r.rel_seek(4)?;
            }

            let num_clip_auto = r.read_u32()?;
            for _ in 0..num_clip_auto {
                r.rel_seek(2 * 4)?;
                let num_points = r.read_u32()?;
                r.rel_seek((num_points as i64) * 3 * 4)?;
            }

            let parent = decode_base_param(r)?;
            objects.push(HierarchyEntry {
                id,
                parent: Some(parent),
                kind,
            });
        }
        Action => {
            let id = r.read_u32()?;
            r.rel_seek(2)?; // action-type
            let parent = r.read_u32()?;
            objects.push(HierarchyEntry {
                id,
                parent: Some(parent),
                kind,
            });
        }
        RanSeqCntr | SwitchCntr | ActorMixer | LayerCntr => {
            let id = r.read_u32()?;
            let parent = decode_base_param(r)?;
            objects.push(HierarchyEntry {
                id,
                parent: Some(parent),
                kind,
            });
        }
        MusicSegment | MusicSwitchCntr | MusicRanSeqCntr => {
            let id = r.read_u32()?;
            r.rel_seek(1)?; // flag byte
            let parent = decode_base_param(r)?;
            objects.push(HierarchyEntry {
                id,
                parent: Some(parent),
                kind,
            });
        }
        State | Event | Bus | Attenuation | DialogueEvent | FxShareSet | FxCustom | AuxBus
        | LFOModulator | EnvelopeModulator | AudioDevice | TimeModulator => {
            let id = r.read_u32()?;
            objects.push(HierarchyEntry {
                id,
                parent: None,
                kind,
            });
        }
        Unknown(_) => {
            let remaining = record_end.saturating_sub(r.tell());
            let id = if remaining >= 4 { r.read_u32()? } else { 0 };
            objects.push(HierarchyEntry {
                id,
                parent: None,
                kind,
            });
        }
    }

    Ok(())
}

use archive::ByteReader;

use crate::error::Result;

/// One hierarchy node: `(id, parent, kind)`. `parent` is `None` for kinds
/// that don't carry a BaseParam epilogue (or whose parent field is unused).
#[derive(Debug, Clone, Copy)]
pub struct HierarchyEntry {
    pub id: u32,
    pub parent: Option<u32>,
    pub kind: crate::kinds::HircKind,
}

/// One playable-media reference surfaced by a Sound or MusicTrack record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundEntry {
    pub object_id: u32,
    pub source_id: u32,
}

/// Decoded `HIRC` chunk of one soundbank.
#[derive(Debug, Clone)]
pub struct Hirc {
    pub header: u32,
    pub objects: Vec<HierarchyEntry>,
    pub sounds: Vec<SoundEntry>,
}

/// Draft of one `BankSourceData` record: a candidate sound source before
/// it's attached to its owning object id.
#[derive(Debug, Clone, Copy)]
pub struct BankSourceDraft {
    pub source_id: u32,
}

/// Decodes one `BankSourceData` body, per the format's plugin-param
/// convention: a parameter blob trails the fixed fields only when the
/// plugin id's low nibble is 2 (and the plugin id itself is non-zero).
pub fn decode_bank_source_data(r: &mut impl ByteReader) -> Result<BankSourceDraft> {
    let plugin_id = r.read_u32()?;
    let _stream_type = r.read_u8()?;
    let source_id = r.read_u32()?;
    let _in_memory_size = r.read_u32()?;
    let _source_bits = r.read_u8()?;
    if (plugin_id & 0x0F) == 2 && plugin_id != 0 {
        let param_size = r.read_u32()?;
        r.rel_seek(param_size as i64)?;
    }
    Ok(BankSourceDraft { source_id })
}

/// Decodes the `BaseParam` epilogue shared by node-like kinds and returns
/// the node's direct parent id.
pub fn decode_base_param(r: &mut impl ByteReader) -> Result<u32> {
    r.rel_seek(1)?; // override-parent-fx flag

    let num_fx = r.read_u8()?;
    if num_fx != 0 {
        r.rel_seek(1 + (num_fx as i64) * 7)?;
    }

    r.rel_seek(1)?;
    let num_fx_meta = r.read_u8()?;
    r.rel_seek((num_fx_meta as i64) * 6)?;

    r.rel_seek(5)?; // 1 flag byte + override-bus id (u32)

    Ok(r.read_u32()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use archive::InPlaceReader;

    #[test]
    fn bank_source_data_without_plugin_param() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u32.to_le_bytes()); // plugin_id, low nibble 1
        buf.push(0); // stream_type
        buf.extend_from_slice(&42u32.to_le_bytes()); // source_id
        buf.extend_from_slice(&0u32.to_le_bytes()); // in_memory_size
        buf.push(0); // source_bits
        buf.extend_from_slice(b"TAIL");

        let mut r = InPlaceReader::new(&buf);
        let draft = decode_bank_source_data(&mut r).unwrap();
        assert_eq!(draft.source_id, 42);
        assert_eq!(r.remaining(), 4);
    }

    #[test]
    fn bank_source_data_with_plugin_param_skips_blob() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0x12u32.to_le_bytes()); // low nibble 2, nonzero
        buf.push(0);
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.push(0);
        buf.extend_from_slice(&3u32.to_le_bytes()); // param_size
        buf.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
        buf.extend_from_slice(b"TAIL");

        let mut r = InPlaceReader::new(&buf);
        let draft = decode_bank_source_data(&mut r).unwrap();
        assert_eq!(draft.source_id, 7);
        assert_eq!(r.remaining(), 4);
    }

    #[test]
    fn base_param_returns_parent_id() {
        let mut buf = Vec::new();
        buf.push(0); // override-parent-fx flag
        buf.push(0); // num_fx = 0
        buf.push(0); // flag
        buf.push(0); // num_fx_meta = 0
        buf.extend_from_slice(&[0u8; 5]); // flag + override bus id
        buf.extend_from_slice(&999u32.to_le_bytes());

        let mut r = InPlaceReader::new(&buf);
        assert_eq!(decode_base_param(&mut r).unwrap(), 999);
    }

    #[test]
    fn base_param_skips_fx_and_fx_metadata_tables() {
        let mut buf = Vec::new();
        buf.push(0);
        buf.push(2); // num_fx = 2
        buf.extend_from_slice(&[0u8; 1 + 2 * 7]);
        buf.push(0);
        buf.push(3); // num_fx_meta = 3
        buf.extend_from_slice(&[0u8; 3 * 6]);
        buf.extend_from_slice(&[0u8; 5]);
        buf.extend_from_slice(&123u32.to_le_bytes());

        let mut r = InPlaceReader::new(&buf);
        assert_eq!(decode_base_param(&mut r).unwrap(), 123);
    }
}

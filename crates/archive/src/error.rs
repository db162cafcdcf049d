use thiserror::Error;

/// Error kinds raised by the archive-access layer (C1, C2, C3, C9).
///
/// Policy for each kind is documented where it's raised; the scheduler and
/// sink layers decide whether a given error aborts the whole run or is
/// logged and skipped.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("short buffer: needed {needed} bytes, {available} available")]
    ShortBuffer { needed: u64, available: u64 },

    #[error("invalid seek to {target} (len {len})")]
    InvalidSeek { target: i64, len: u64 },

    #[error("bad magic: expected {expected:#x}, got {found:#x}")]
    BadMagic { expected: u32, found: u32 },

    #[error("duplicate key {key} within archive {archive_id}")]
    DuplicateKey { archive_id: String, key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

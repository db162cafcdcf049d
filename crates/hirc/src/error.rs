use thiserror::Error;

#[derive(Debug, Error)]
pub enum HircError {
    #[error("truncated HIRC chunk: expected cursor at {expected}, found {found}")]
    TruncatedRecord { expected: u64, found: u64 },

    #[error(transparent)]
    Archive(#[from] archive::ArchiveError),
}

pub type Result<T> = std::result::Result<T, HircError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("bank payload too small to hold a BKHD header: {size} bytes")]
    PayloadTooSmall { size: u64 },

    #[error(transparent)]
    Archive(#[from] archive::ArchiveError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

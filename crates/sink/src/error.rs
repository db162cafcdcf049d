use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("duplicate key in {table}: {key}")]
    DuplicateKey { table: &'static str, key: String },

    #[error("no transaction in progress")]
    NoActiveTransaction,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, SinkError>;

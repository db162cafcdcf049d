use rusqlite::Connection;

use crate::error::Result;

/// Selects how the many-to-many relations (soundbank-per-archive,
/// hierarchy-object-per-soundbank) are materialized. Denormalized repeats
/// rows per archive, matching the original source; Linking normalizes them
/// behind join tables. Both are required to pass the same test suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaMode {
    #[default]
    Denormalized,
    Linking,
}

const COMMON_TABLES: &str = "
CREATE TABLE IF NOT EXISTS archive (
    archive_id TEXT PRIMARY KEY,
    tags TEXT NOT NULL DEFAULT '',
    categories TEXT NOT NULL DEFAULT '',
    date_modified INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS asset (
    archive_id TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    type_id INTEGER NOT NULL,
    data_offset INTEGER NOT NULL,
    stream_offset INTEGER NOT NULL,
    gpu_offset INTEGER NOT NULL,
    data_size INTEGER NOT NULL,
    stream_size INTEGER NOT NULL,
    gpu_size INTEGER NOT NULL,
    idx INTEGER NOT NULL,
    PRIMARY KEY (archive_id, file_id)
);
";

const DENORMALIZED_TABLES: &str = "
CREATE TABLE IF NOT EXISTS soundbank (
    archive_id TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    path_name TEXT NOT NULL,
    readable_name TEXT NOT NULL DEFAULT '',
    categories TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (archive_id, file_id)
);

CREATE TABLE IF NOT EXISTS hierarchy (
    archive_id TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    object_id INTEGER NOT NULL,
    kind INTEGER NOT NULL,
    parent_id INTEGER,
    label TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (archive_id, file_id, object_id)
);

CREATE TABLE IF NOT EXISTS sound (
    archive_id TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    object_id INTEGER NOT NULL,
    source_id INTEGER NOT NULL,
    PRIMARY KEY (archive_id, file_id, object_id, source_id)
);
";

const LINKING_TABLES: &str = "
CREATE TABLE IF NOT EXISTS soundbank (
    path_name TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    readable_name TEXT NOT NULL DEFAULT '',
    categories TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (path_name, file_id)
);

CREATE TABLE IF NOT EXISTS archive_soundbank_link (
    archive_id TEXT NOT NULL,
    path_name TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    PRIMARY KEY (archive_id, path_name, file_id)
);

CREATE TABLE IF NOT EXISTS hierarchy (
    object_id INTEGER PRIMARY KEY,
    kind INTEGER NOT NULL,
    parent_id INTEGER,
    label TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS soundbank_hierarchy_link (
    path_name TEXT NOT NULL,
    file_id INTEGER NOT NULL,
    object_id INTEGER NOT NULL,
    PRIMARY KEY (path_name, file_id, object_id)
);

CREATE TABLE IF NOT EXISTS sound (
    object_id INTEGER NOT NULL,
    source_id INTEGER NOT NULL,
    PRIMARY KEY (object_id, source_id)
);
";

pub fn ensure_schema(conn: &Connection, mode: SchemaMode) -> Result<()> {
    conn.execute_batch(COMMON_TABLES)?;
    match mode {
        SchemaMode::Denormalized => conn.execute_batch(DENORMALIZED_TABLES)?,
        SchemaMode::Linking => conn.execute_batch(LINKING_TABLES)?,
    }
    Ok(())
}

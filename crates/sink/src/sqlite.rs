use rusqlite::{params, Connection};

use crate::error::Result;
use crate::rows::{ArchiveRow, AssetRow, HierarchyRow, SoundRow, SoundbankRow, Table};
use crate::schema::{ensure_schema, SchemaMode};
use crate::sink_trait::Sink;

pub struct SqliteSink {
    conn: Connection,
    mode: SchemaMode,
}

impl SqliteSink {
    pub fn open(conn: Connection, mode: SchemaMode) -> Result<Self> {
        ensure_schema(&conn, mode)?;
        Ok(Self { conn, mode })
    }

    pub fn mode(&self) -> SchemaMode {
        self.mode
    }
}

impl Sink for SqliteSink {
    fn begin_tx(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn delete_all(&mut self, table: Table) -> Result<()> {
        match (self.mode, table) {
            (SchemaMode::Linking, Table::Soundbank) => {
                self.conn.execute("DELETE FROM archive_soundbank_link", [])?;
                self.conn.execute("DELETE FROM soundbank", [])?;
            }
            (SchemaMode::Linking, Table::Hierarchy) => {
                self.conn.execute("DELETE FROM soundbank_hierarchy_link", [])?;
                self.conn.execute("DELETE FROM hierarchy", [])?;
            }
            _ => {
                self.conn
                    .execute(&format!("DELETE FROM {}", table.name()), [])?;
            }
        }
        Ok(())
    }

    fn insert_archive(&mut self, row: &ArchiveRow) -> Result<()> {
        self.conn.execute(
            "INSERT INTO archive (archive_id, tags, categories, date_modified) VALUES (?1, ?2, ?3, ?4)",
            params![row.archive_id, row.tags, row.categories, row.date_modified],
        )?;
        Ok(())
    }

    fn insert_asset(&mut self, row: &AssetRow) -> Result<()> {
        self.conn.execute(
            "INSERT INTO asset (archive_id, file_id, type_id, data_offset, stream_offset, gpu_offset, data_size, stream_size, gpu_size, idx) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                row.archive_id,
                row.file_id as i64,
                row.type_id as i64,
                row.data_offset as i64,
                row.stream_offset as i64,
                row.gpu_offset as i64,
                row.data_size,
                row.stream_size,
                row.gpu_size,
                row.index,
            ],
        )?;
        Ok(())
    }

    fn insert_soundbank(&mut self, row: &SoundbankRow) -> Result<()> {
        match self.mode {
            SchemaMode::Denormalized => {
                self.conn.execute(
                    "INSERT INTO soundbank (archive_id, file_id, path_name, readable_name, categories) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![row.archive_id, row.file_id as i64, row.path_name, row.readable_name, row.categories],
                )?;
            }
            SchemaMode::Linking => {
                self.conn.execute(
                    "INSERT OR IGNORE INTO soundbank (path_name, file_id, readable_name, categories) \
                     VALUES (?1, ?2, ?3, ?4)",
                    params![row.path_name, row.file_id as i64, row.readable_name, row.categories],
                )?;
                self.conn.execute(
                    "INSERT INTO archive_soundbank_link (archive_id, path_name, file_id) VALUES (?1, ?2, ?3)",
                    params![row.archive_id, row.path_name, row.file_id as i64],
                )?;
            }
        }
        Ok(())
    }

    fn insert_hierarchy(&mut self, row: &HierarchyRow) -> Result<()> {
        match self.mode {
            SchemaMode::Denormalized => {
                self.conn.execute(
                    "INSERT INTO hierarchy (archive_id, file_id, object_id, kind, parent_id, label, tags, description) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        row.archive_id,
                        row.file_id as i64,
                        row.object_id,
                        row.kind,
                        row.parent_id,
                        row.label,
                        row.tags,
                        row.description,
                    ],
                )?;
            }
            SchemaMode::Linking => {
                self.conn.execute(
                    "INSERT OR IGNORE INTO hierarchy (object_id, kind, parent_id, label, tags, description) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![row.object_id, row.kind, row.parent_id, row.label, row.tags, row.description],
                )?;
                self.conn.execute(
                    "INSERT OR IGNORE INTO soundbank_hierarchy_link (path_name, file_id, object_id) VALUES ( \
                        (SELECT path_name FROM soundbank WHERE file_id = ?1 LIMIT 1), ?1, ?2)",
                    params![row.file_id as i64, row.object_id],
                )?;
            }
        }
        Ok(())
    }

    fn insert_sound(&mut self, row: &SoundRow) -> Result<()> {
        match self.mode {
            SchemaMode::Denormalized => {
                self.conn.execute(
                    "INSERT INTO sound (archive_id, file_id, object_id, source_id) VALUES (?1, ?2, ?3, ?4)",
                    params![row.archive_id, row.file_id as i64, row.object_id, row.source_id],
                )?;
            }
            SchemaMode::Linking => {
                self.conn.execute(
                    "INSERT OR IGNORE INTO sound (object_id, source_id) VALUES (?1, ?2)",
                    params![row.object_id, row.source_id],
                )?;
            }
        }
        Ok(())
    }

    fn get_all_archive(&self) -> Result<Vec<ArchiveRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT archive_id, tags, categories, date_modified FROM archive ORDER BY archive_id")?;
        let rows = stmt.query_map([], |r| {
            Ok(ArchiveRow {
                archive_id: r.get(0)?,
                tags: r.get(1)?,
                categories: r.get(2)?,
                date_modified: r.get(3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn get_all_soundbank(&self) -> Result<Vec<SoundbankRow>> {
        let query = match self.mode {
            SchemaMode::Denormalized => {
                "SELECT archive_id, file_id, path_name, readable_name, categories FROM soundbank ORDER BY archive_id, file_id"
            }
            SchemaMode::Linking => {
                "SELECT l.archive_id, s.file_id, s.path_name, s.readable_name, s.categories \
                 FROM soundbank s JOIN archive_soundbank_link l ON l.path_name = s.path_name AND l.file_id = s.file_id \
                 ORDER BY l.archive_id, s.file_id"
            }
        };
        let mut stmt = self.conn.prepare(query)?;
        let rows = stmt.query_map([], |r| {
            Ok(SoundbankRow {
                archive_id: r.get(0)?,
                file_id: r.get::<_, i64>(1)? as u64,
                path_name: r.get(2)?,
                readable_name: r.get(3)?,
                categories: r.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

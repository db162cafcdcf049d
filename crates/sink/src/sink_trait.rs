use crate::error::Result;
use crate::rows::{ArchiveRow, AssetRow, HierarchyRow, SoundRow, SoundbankRow, Table};

/// Persistence-agnostic sink contract. A `SqliteSink` is the only
/// implementation shipped here, but callers depend on this trait so an
/// alternate backend can be substituted without touching the pipeline.
pub trait Sink {
    fn begin_tx(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;

    fn delete_all(&mut self, table: Table) -> Result<()>;

    fn insert_archive(&mut self, row: &ArchiveRow) -> Result<()>;
    fn insert_asset(&mut self, row: &AssetRow) -> Result<()>;
    fn insert_soundbank(&mut self, row: &SoundbankRow) -> Result<()>;
    fn insert_hierarchy(&mut self, row: &HierarchyRow) -> Result<()>;
    fn insert_sound(&mut self, row: &SoundRow) -> Result<()>;

    fn get_all_archive(&self) -> Result<Vec<ArchiveRow>>;
    fn get_all_soundbank(&self) -> Result<Vec<SoundbankRow>>;

    /// Deletes all archive rows and inserts `rows`, in one transaction.
    fn replace_archives(&mut self, rows: &[ArchiveRow]) -> Result<()> {
        self.begin_tx()?;
        let outcome = (|| {
            self.delete_all(Table::Archive)?;
            for row in rows {
                self.insert_archive(row)?;
            }
            Ok(())
        })();
        match outcome {
            Ok(()) => self.commit(),
            Err(e) => {
                let _ = self.rollback();
                Err(e)
            }
        }
    }

    /// Deletes child tables first, then soundbanks, then inserts everything
    /// in foreign-key-safe order, all within one transaction.
    fn replace_all(
        &mut self,
        archives: &[ArchiveRow],
        assets: &[AssetRow],
        soundbanks: &[SoundbankRow],
        hierarchy: &[HierarchyRow],
        sounds: &[SoundRow],
    ) -> Result<()> {
        self.begin_tx()?;
        log::debug!(
            "replace_all: {} archives, {} assets, {} soundbanks, {} hierarchy, {} sounds",
            archives.len(),
            assets.len(),
            soundbanks.len(),
            hierarchy.len(),
            sounds.len()
        );
        let outcome = (|| {
            self.delete_all(Table::Sound)?;
            self.delete_all(Table::Hierarchy)?;
            self.delete_all(Table::Soundbank)?;
            self.delete_all(Table::Asset)?;
            self.delete_all(Table::Archive)?;

            for row in archives {
                self.insert_archive(row)?;
            }
            for row in assets {
                self.insert_asset(row)?;
            }
            for row in soundbanks {
                self.insert_soundbank(row)?;
            }
            for row in hierarchy {
                self.insert_hierarchy(row)?;
            }
            for row in sounds {
                self.insert_sound(row)?;
            }
            Ok(())
        })();
        match outcome {
            Ok(()) => self.commit(),
            Err(e) => {
                let _ = self.rollback();
                Err(e)
            }
        }
    }
}

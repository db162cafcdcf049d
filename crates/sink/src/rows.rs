#[derive(Debug, Clone)]
pub struct ArchiveRow {
    pub archive_id: String,
    pub tags: String,
    pub categories: String,
    pub date_modified: i64,
}

#[derive(Debug, Clone)]
pub struct AssetRow {
    pub archive_id: String,
    pub file_id: u64,
    pub type_id: u64,
    pub data_offset: u64,
    pub stream_offset: u64,
    pub gpu_offset: u64,
    pub data_size: u32,
    pub stream_size: u32,
    pub gpu_size: u32,
    pub index: u32,
}

#[derive(Debug, Clone)]
pub struct SoundbankRow {
    pub archive_id: String,
    pub file_id: u64,
    pub path_name: String,
    pub readable_name: String,
    pub categories: String,
}

#[derive(Debug, Clone)]
pub struct HierarchyRow {
    pub archive_id: String,
    pub file_id: u64,
    pub object_id: u32,
    pub kind: u8,
    pub parent_id: Option<u32>,
    pub label: String,
    pub tags: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct SoundRow {
    pub archive_id: String,
    pub file_id: u64,
    pub object_id: u32,
    pub source_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Archive,
    Asset,
    Soundbank,
    Hierarchy,
    Sound,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Archive => "archive",
            Table::Asset => "asset",
            Table::Soundbank => "soundbank",
            Table::Hierarchy => "hierarchy",
            Table::Sound => "sound",
        }
    }
}

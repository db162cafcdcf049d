pub mod error;
pub mod rows;
pub mod schema;
pub mod sink_trait;
pub mod sqlite;

pub use error::{Result, SinkError};
pub use rows::{ArchiveRow, AssetRow, HierarchyRow, SoundRow, SoundbankRow, Table};
pub use schema::{ensure_schema, SchemaMode};
pub use sink_trait::Sink;
pub use sqlite::SqliteSink;

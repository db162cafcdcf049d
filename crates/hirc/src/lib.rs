pub mod error;
pub mod kinds;
pub mod parse;
pub mod records;

pub use error::{HircError, Result};
pub use kinds::HircKind;
pub use parse::parse_hirc;
pub use records::{decode_bank_source_data, decode_base_param, Hirc, HierarchyEntry, SoundEntry};

pub mod error;
pub mod exporter;

pub use error::{ExportError, Result};
pub use exporter::{export_bank, export_many, BankLocation};

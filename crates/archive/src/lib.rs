pub mod error;
pub mod header;
pub mod listing;
pub mod locator;
pub mod reader;

pub use error::{ArchiveError, Result};
pub use header::{
    decode_archive_header, decode_asset_headers_parallel, decode_asset_headers_sequential,
    ArchiveHeader, AssetClass, AssetHeader, TypeCount, DecodedHeaders,
};
pub use listing::{is_ignored, list_archives};
pub use locator::{extract_banks, RawBank};
pub use reader::{ByteReader, InPlaceReader, StreamReader};

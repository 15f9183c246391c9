//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, report serialization)
//! - `sync_reader` - Synchronous operation reader with iterator interface
//! - `async_reader` - Asynchronous operation reader with batch reading interface
//! - `catalog_reader` - `name,price` catalog files

pub mod async_reader;
pub mod catalog_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use catalog_reader::{load_catalog, read_catalog};
pub use csv_format::{convert_csv_record, write_accounts_csv, CsvRecord};
pub use sync_reader::SyncReader;

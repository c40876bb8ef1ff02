// Storage module - column files, table directories and the schema catalog

mod catalog;
pub mod column_file;
mod table;

pub use catalog::{Catalog, CATALOG_FILE};
pub use column_file::ColumnFile;
pub use table::{Table, TABLE_META_FILE};

/// Directory under the data directory that holds one subdirectory per table.
pub const TABLES_DIR: &str = "tables";

// Tate - minimal single-node columnar database
// SQL front end, columnar storage and a single-pass query executor

// Clippy configuration - allow non-critical warnings
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

// Core types (values, data types, schemas, errors)
pub mod core;

// SQL lexer and Pratt parser
pub mod parser;

// Column files, table directories, JSON catalog
pub mod storage;

// Statement execution (DDL, INSERT, SELECT, aggregates)
pub mod executor;

// Layered configuration for the binary
pub mod config;

// Interactive shell
pub mod shell;

// Re-export commonly used types for convenience
pub use core::{ColumnDef, DataType, DatabaseError, TableSchema, Value};
pub use parser::{parse_statement, Statement};
pub use executor::{Executor, QueryResult};
pub use storage::{Catalog, Table};
pub use config::TateConfig;

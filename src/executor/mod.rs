/// Executor module - runs parsed statements against the catalog and tables
///
/// Structure:
/// - conditions: expression and WHERE evaluation
/// - ddl: CREATE TABLE / DROP TABLE
/// - dml: INSERT
/// - queries: SELECT (projection and aggregate paths)
/// - result: QueryResult and its table rendering

pub mod conditions;
pub mod ddl;
pub mod dml;
pub mod queries;
mod result;

pub use conditions::ExpressionEvaluator;
pub use ddl::DdlExecutor;
pub use dml::DmlExecutor;
pub use queries::QueryExecutor;
pub use result::QueryResult;

use crate::core::DatabaseError;
use crate::parser::Statement;
use crate::storage::{Catalog, Table, TABLES_DIR};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Executes statements. Tables are opened lazily on first use and stay
/// cached for the executor's lifetime.
pub struct Executor {
    catalog: Arc<Catalog>,
    tables_dir: PathBuf,
    tables: Mutex<HashMap<String, Table>>,
}

impl Executor {
    pub fn new(catalog: Arc<Catalog>, data_dir: impl AsRef<Path>) -> Self {
        Self {
            catalog,
            tables_dir: data_dir.as_ref().join(TABLES_DIR),
            tables: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn execute(&self, stmt: Statement) -> Result<QueryResult, DatabaseError> {
        match stmt {
            Statement::CreateTable { name, columns } => {
                debug!(table = %name, "executing CREATE TABLE");
                DdlExecutor::create_table(self, &name, &columns)
            }
            Statement::DropTable { name, if_exists } => {
                debug!(table = %name, if_exists, "executing DROP TABLE");
                DdlExecutor::drop_table(self, &name, if_exists)
            }
            Statement::Insert { table, columns, values } => {
                debug!(table = %table, "executing INSERT");
                DmlExecutor::insert(self, &table, columns.as_deref(), &values)
            }
            Statement::Select {
                distinct,
                columns,
                from,
                filter,
                order_by,
                limit,
                offset,
            } => {
                debug!(table = %from, "executing SELECT");
                self.with_table(&from, |table| {
                    QueryExecutor::select(
                        table,
                        distinct,
                        &columns,
                        filter.as_ref(),
                        &order_by,
                        limit,
                        offset,
                    )
                })
            }
        }
    }

    /// Runs `f` on the named table, loading it into the cache if needed.
    fn with_table<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Table) -> Result<R, DatabaseError>,
    ) -> Result<R, DatabaseError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let table = match tables.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                if !self.catalog.table_exists(name) {
                    return Err(DatabaseError::TableNotFound(name.to_string()));
                }
                entry.insert(Table::load(&self.tables_dir, name)?)
            }
        };
        f(table)
    }
}

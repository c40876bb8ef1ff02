/// DDL (Data Definition Language) operations
///
/// CREATE TABLE, DROP TABLE

use crate::core::{DataType, DatabaseError, TableSchema};
use crate::parser::ColumnDefinition;
use crate::storage::Table;
use std::sync::PoisonError;
use tracing::{info, warn};
use super::{Executor, QueryResult};

pub struct DdlExecutor;

impl DdlExecutor {
    /// Execute CREATE TABLE statement
    ///
    /// The schema is registered in the catalog first; if the table's storage
    /// cannot be created the registration is rolled back.
    pub fn create_table(
        executor: &Executor,
        name: &str,
        column_defs: &[ColumnDefinition],
    ) -> Result<QueryResult, DatabaseError> {
        if executor.catalog.table_exists(name) {
            return Err(DatabaseError::TableAlreadyExists(name.to_string()));
        }

        let mut schema = TableSchema::new(name);
        for def in column_defs {
            // column files are named after the column
            if schema.get_column_index(&def.name).is_some() {
                return Err(DatabaseError::DuplicateColumn(def.name.clone()));
            }
            // unknown type names become untyped columns
            schema.add_column(def.name.clone(), DataType::from_name(&def.data_type), def.nullable);
        }

        executor.catalog.register_table(schema.clone())?;

        let table = match Table::create(&executor.tables_dir, schema) {
            Ok(table) => table,
            Err(e) => {
                warn!(table = name, error = %e, "table storage creation failed, rolling back catalog entry");
                if let Err(rollback) = executor.catalog.drop_table(name) {
                    warn!(table = name, error = %rollback, "catalog rollback failed");
                }
                return Err(e);
            }
        };

        executor
            .tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), table);

        info!(table = name, "table created");
        Ok(QueryResult::with_message(format!("Table '{name}' created successfully")))
    }

    /// Execute DROP TABLE statement
    ///
    /// Evicts the cached table, deletes its directory, then removes the
    /// catalog entry.
    pub fn drop_table(
        executor: &Executor,
        name: &str,
        if_exists: bool,
    ) -> Result<QueryResult, DatabaseError> {
        if !executor.catalog.table_exists(name) {
            if if_exists {
                return Ok(QueryResult::with_message("OK"));
            }
            return Err(DatabaseError::TableNotFound(name.to_string()));
        }

        let cached = executor
            .tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        match cached {
            Some(table) => table.drop()?,
            None => Table::remove(&executor.tables_dir, name)?,
        }

        executor.catalog.drop_table(name)?;

        info!(table = name, "table dropped");
        Ok(QueryResult::with_message(format!("Table '{name}' dropped successfully")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_statement;
    use crate::storage::Catalog;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Executor) {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Arc::new(Catalog::open(temp_dir.path()).unwrap());
        let executor = Executor::new(catalog, temp_dir.path());
        (temp_dir, executor)
    }

    fn run(executor: &Executor, sql: &str) -> Result<QueryResult, DatabaseError> {
        executor.execute(parse_statement(sql).unwrap())
    }

    #[test]
    fn test_create_table_registers_schema() {
        let (dir, executor) = setup();
        let result = run(&executor, "CREATE TABLE users (id INT64 NOT NULL, name STRING, blob WIDGET)").unwrap();
        assert_eq!(result.message.as_deref(), Some("Table 'users' created successfully"));

        let schema = executor.catalog().get_table("users").unwrap();
        assert_eq!(schema.column_names(), vec!["id", "name", "blob"]);
        assert_eq!(schema.columns[0].data_type, DataType::Int64);
        assert!(!schema.columns[0].nullable);
        assert_eq!(schema.columns[2].data_type, DataType::Null);
        assert!(dir.path().join("tables/users/_meta.json").exists());
    }

    #[test]
    fn test_duplicate_create_fails() {
        let (_dir, executor) = setup();
        run(&executor, "CREATE TABLE t (id INT64)").unwrap();
        assert!(matches!(
            run(&executor, "CREATE TABLE t (other STRING)"),
            Err(DatabaseError::TableAlreadyExists(_))
        ));
        assert_eq!(executor.catalog().get_table("t").unwrap().column_names(), vec!["id"]);
    }

    #[test]
    fn test_duplicate_column_names_rejected() {
        let (dir, executor) = setup();
        assert!(matches!(
            run(&executor, "CREATE TABLE t (a INT64, a STRING)"),
            Err(DatabaseError::DuplicateColumn(ref col)) if col == "a"
        ));
        assert!(!executor.catalog().table_exists("t"));
        assert!(!dir.path().join("tables/t").exists());
    }

    #[test]
    fn test_failed_storage_rolls_back_catalog() {
        let (dir, executor) = setup();
        // a plain file where the tables directory should be
        fs::write(dir.path().join("tables"), b"").unwrap();

        assert!(run(&executor, "CREATE TABLE t (id INT64)").is_err());
        assert!(!executor.catalog().table_exists("t"));
    }

    #[test]
    fn test_drop_table() {
        let (dir, executor) = setup();
        run(&executor, "CREATE TABLE t (id INT64)").unwrap();
        run(&executor, "DROP TABLE t").unwrap();

        assert!(!executor.catalog().table_exists("t"));
        assert!(!dir.path().join("tables/t").exists());
        assert!(matches!(run(&executor, "DROP TABLE t"), Err(DatabaseError::TableNotFound(_))));
        assert_eq!(run(&executor, "DROP TABLE IF EXISTS t").unwrap().message.as_deref(), Some("OK"));
    }

    #[test]
    fn test_drop_uncached_table_removes_directory() {
        let (dir, executor) = setup();
        run(&executor, "CREATE TABLE t (id INT64)").unwrap();

        // a fresh executor has nothing cached
        let fresh = Executor::new(Arc::new(Catalog::open(dir.path()).unwrap()), dir.path());
        run(&fresh, "DROP TABLE t").unwrap();
        assert!(!dir.path().join("tables/t").exists());
    }
}

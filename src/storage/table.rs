use super::column_file::ColumnFile;
use crate::core::{DatabaseError, TableSchema, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Schema sidecar kept next to the column files.
pub const TABLE_META_FILE: &str = "_meta.json";

/// A table on disk: `<tables_dir>/<name>/` with one `col_<column>.dat` per
/// column plus the `_meta.json` schema sidecar.
#[derive(Debug)]
pub struct Table {
    schema: TableSchema,
    dir: PathBuf,
    /// In schema order.
    columns: Vec<ColumnFile>,
}

impl Table {
    /// Creates the table directory, the sidecar and one empty file per column.
    pub fn create(tables_dir: &Path, schema: TableSchema) -> Result<Self, DatabaseError> {
        let dir = tables_dir.join(&schema.name);
        fs::create_dir_all(&dir)?;

        let columns = schema
            .columns
            .iter()
            .map(|col| ColumnFile::new(column_path(&dir, &col.name), col.data_type))
            .collect();
        let table = Self { schema, dir, columns };
        table.save()?;

        info!(table = %table.schema.name, dir = %table.dir.display(), "created table storage");
        Ok(table)
    }

    /// Opens an existing table. The sidecar is authoritative for the schema.
    pub fn load(tables_dir: &Path, name: &str) -> Result<Self, DatabaseError> {
        let dir = tables_dir.join(name);
        let meta_path = dir.join(TABLE_META_FILE);
        if !meta_path.exists() {
            return Err(DatabaseError::TableNotFound(name.to_string()));
        }

        let schema: TableSchema = serde_json::from_str(&fs::read_to_string(&meta_path)?)?;
        let columns = schema
            .columns
            .iter()
            .map(|col| {
                let column = ColumnFile::load(column_path(&dir, &col.name))?;
                if column.data_type() != col.data_type {
                    return Err(DatabaseError::InvalidColumnFile {
                        path: column.path().display().to_string(),
                        reason: format!(
                            "holds {} data, schema declares {}",
                            column.data_type(),
                            col.data_type
                        ),
                    });
                }
                Ok(column)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // every column must hold the same number of rows
        if let Some(first) = columns.first() {
            let rows = first.row_count();
            if let Some(bad) = columns.iter().find(|c| c.row_count() != rows) {
                return Err(DatabaseError::InvalidColumnFile {
                    path: bad.path().display().to_string(),
                    reason: format!("holds {} rows, table has {rows}", bad.row_count()),
                });
            }
        }

        debug!(table = name, rows = columns.first().map_or(0, ColumnFile::row_count), "loaded table");
        Ok(Self { schema, dir, columns })
    }

    #[must_use]
    pub const fn schema(&self) -> &TableSchema {
        &self.schema
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, ColumnFile::row_count)
    }

    /// Appends one row, given in schema order. Nothing is appended unless
    /// every value fits its column. Call [`Table::save`] to persist.
    pub fn insert(&mut self, values: &[Value]) -> Result<(), DatabaseError> {
        if values.len() != self.columns.len() {
            return Err(DatabaseError::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(values) {
            column.check(value)?;
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.append(value)?;
        }
        Ok(())
    }

    /// Removes the last appended row from every column. Files on disk are
    /// untouched until the next [`Table::save`].
    pub fn pop_row(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        for column in &mut self.columns {
            column.truncate_last();
        }
    }

    /// Visits rows in insertion order. The callback returns `false` to stop.
    pub fn scan<F>(&self, mut visit: F) -> Result<(), DatabaseError>
    where
        F: FnMut(usize, &[Value]) -> bool,
    {
        let mut row = Vec::with_capacity(self.columns.len());
        for index in 0..self.row_count() {
            row.clear();
            for column in &self.columns {
                row.push(column.get(index)?);
            }
            if !visit(index, &row) {
                break;
            }
        }
        Ok(())
    }

    /// Rewrites the sidecar and every column file.
    pub fn save(&self) -> Result<(), DatabaseError> {
        let meta = serde_json::to_string_pretty(&self.schema)?;
        fs::write(self.dir.join(TABLE_META_FILE), meta)?;
        for column in &self.columns {
            column.save()?;
        }
        debug!(table = %self.schema.name, rows = self.row_count(), "saved table");
        Ok(())
    }

    /// Deletes the table's directory.
    pub fn drop(self) -> Result<(), DatabaseError> {
        remove_table_dir(&self.dir)
    }

    /// Deletes `<tables_dir>/<name>` whether or not the table was ever opened.
    pub fn remove(tables_dir: &Path, name: &str) -> Result<(), DatabaseError> {
        remove_table_dir(&tables_dir.join(name))
    }
}

fn remove_table_dir(dir: &Path) -> Result<(), DatabaseError> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
        info!(dir = %dir.display(), "removed table storage");
    }
    Ok(())
}

fn column_path(dir: &Path, column: &str) -> PathBuf {
    dir.join(format!("col_{column}.dat"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;
    use tempfile::TempDir;

    fn users_schema() -> TableSchema {
        let mut schema = TableSchema::new("users");
        schema.add_column("id", DataType::Int64, false);
        schema.add_column("name", DataType::String, true);
        schema
    }

    fn collect_rows(table: &Table) -> Vec<Vec<Value>> {
        let mut rows = Vec::new();
        table
            .scan(|_, row| {
                rows.push(row.to_vec());
                true
            })
            .unwrap();
        rows
    }

    #[test]
    fn test_create_lays_out_directory() {
        let temp_dir = TempDir::new().unwrap();
        let table = Table::create(temp_dir.path(), users_schema()).unwrap();

        let dir = temp_dir.path().join("users");
        assert_eq!(table.dir(), dir);
        assert!(dir.join("_meta.json").exists());
        assert!(dir.join("col_id.dat").exists());
        assert!(dir.join("col_name.dat").exists());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_insert_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = Table::create(temp_dir.path(), users_schema()).unwrap();
        table
            .insert(&[Value::Int64(1), Value::String("Alice".to_string())])
            .unwrap();
        table.insert(&[Value::Int64(2), Value::Null]).unwrap();
        table.save().unwrap();

        let loaded = Table::load(temp_dir.path(), "users").unwrap();
        assert_eq!(loaded.schema(), &users_schema());
        assert_eq!(
            collect_rows(&loaded),
            vec![
                vec![Value::Int64(1), Value::String("Alice".to_string())],
                vec![Value::Int64(2), Value::Null],
            ]
        );
    }

    #[test]
    fn test_insert_is_all_or_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = Table::create(temp_dir.path(), users_schema()).unwrap();

        let err = table
            .insert(&[Value::Int64(1), Value::Int64(2)])
            .unwrap_err();
        assert!(matches!(err, DatabaseError::TypeMismatch { .. }));
        assert!(matches!(
            table.insert(&[Value::Int64(1)]),
            Err(DatabaseError::ColumnCountMismatch { expected: 2, actual: 1 })
        ));
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_pop_row() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = Table::create(temp_dir.path(), users_schema()).unwrap();
        table.insert(&[Value::Int64(1), Value::String("a".to_string())]).unwrap();
        table.insert(&[Value::Int64(2), Value::Null]).unwrap();

        table.pop_row();
        assert_eq!(
            collect_rows(&table),
            vec![vec![Value::Int64(1), Value::String("a".to_string())]]
        );
        table.pop_row();
        table.pop_row();
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_load_rejects_column_type_drift() {
        let temp_dir = TempDir::new().unwrap();
        Table::create(temp_dir.path(), users_schema()).unwrap();
        // id is INT64 in the sidecar
        let path = temp_dir.path().join("users").join("col_id.dat");
        ColumnFile::new(&path, DataType::String).save().unwrap();

        match Table::load(temp_dir.path(), "users") {
            Err(DatabaseError::InvalidColumnFile { reason, .. }) => {
                assert!(reason.contains("STRING"), "{reason}");
            }
            other => panic!("expected InvalidColumnFile, got {other:?}"),
        }
    }

    #[test]
    fn test_scan_stops_early() {
        let temp_dir = TempDir::new().unwrap();
        let mut table = Table::create(temp_dir.path(), users_schema()).unwrap();
        for i in 0..5 {
            table.insert(&[Value::Int64(i), Value::Null]).unwrap();
        }

        let mut seen = Vec::new();
        table
            .scan(|index, _| {
                seen.push(index);
                index < 2
            })
            .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_load_missing_table() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            Table::load(temp_dir.path(), "ghost"),
            Err(DatabaseError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_drop_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let table = Table::create(temp_dir.path(), users_schema()).unwrap();
        table.drop().unwrap();
        assert!(!temp_dir.path().join("users").exists());

        Table::create(temp_dir.path(), users_schema()).unwrap();
        Table::remove(temp_dir.path(), "users").unwrap();
        assert!(!temp_dir.path().join("users").exists());
        // removing again is a no-op
        Table::remove(temp_dir.path(), "users").unwrap();
    }
}

use crate::core::{DatabaseError, TableSchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

pub const CATALOG_FILE: &str = "catalog.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogData {
    tables: BTreeMap<String, TableSchema>,
}

/// Registry of table schemas, persisted wholesale as `<data_dir>/catalog.json`.
///
/// Lookups take a shared lock. Mutations take the exclusive lock, rewrite the
/// file, and undo the in-memory change if the write fails.
#[derive(Debug)]
pub struct Catalog {
    path: PathBuf,
    data: RwLock<CatalogData>,
}

impl Catalog {
    /// Opens the catalog under `data_dir`, creating the directory if needed.
    /// A missing catalog file means an empty catalog.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(CATALOG_FILE);

        let data = if path.exists() {
            let data: CatalogData = serde_json::from_str(&fs::read_to_string(&path)?)?;
            debug!(path = %path.display(), tables = data.tables.len(), "loaded catalog");
            data
        } else {
            CatalogData::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn register_table(&self, schema: TableSchema) -> Result<(), DatabaseError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        if data.tables.contains_key(&schema.name) {
            return Err(DatabaseError::TableAlreadyExists(schema.name));
        }

        let name = schema.name.clone();
        data.tables.insert(name.clone(), schema);
        if let Err(e) = self.save(&data) {
            warn!(table = %name, error = %e, "catalog write failed, rolling back registration");
            data.tables.remove(&name);
            return Err(e);
        }
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> Result<(), DatabaseError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        let Some(schema) = data.tables.remove(name) else {
            return Err(DatabaseError::TableNotFound(name.to_string()));
        };

        if let Err(e) = self.save(&data) {
            warn!(table = name, error = %e, "catalog write failed, restoring entry");
            data.tables.insert(name.to_string(), schema);
            return Err(e);
        }
        Ok(())
    }

    /// Returns a copy of the schema.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<TableSchema> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.tables.get(name).cloned()
    }

    #[must_use]
    pub fn table_exists(&self, name: &str) -> bool {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.tables.contains_key(name)
    }

    /// Table names, sorted.
    #[must_use]
    pub fn list_tables(&self) -> Vec<String> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.tables.keys().cloned().collect()
    }

    fn save(&self, data: &CatalogData) -> Result<(), DatabaseError> {
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), tables = data.tables.len(), "saved catalog");
        Ok(())
    }
}

//! A shared table allows for sharing one table over multiple threads.
//!
//! Reads share the table, anything that changes the row store, the log
//! buffer or the table file takes it exclusively. Opening a table through
//! [`SharedTable::open`] also takes an advisory lock on the table, so that
//! a second owner of the same table fails to open it.

use std::fs;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::config::TableConfig;
use crate::data::row::{Record, Row};
use crate::data::types::ColumnType;
use crate::dynamic_table::DynamicTable;
use crate::error::Error;
use crate::logs::LogEntry;
use crate::queries::condition::{Condition, UpdateSet};
use crate::tables::table::{Source, Table};
use crate::tables::table_schema::TableSchema;

pub const LOCK_FILE_EXTENSION: &str = "lock";

/// A shared table
#[derive(Debug, Clone)]
pub struct SharedTable(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    table: RwLock<Table>,
    _lock: Option<TableLock>,
}

impl SharedTable {
    /// Shares a table, without taking a lock on it
    pub fn new(table: Table) -> Self {
        Self(Arc::new(Inner {
            table: RwLock::new(table),
            _lock: None,
        }))
    }

    /// Opens the table `name`, locking it if the configuration asks for it
    pub fn open(name: impl AsRef<str>, config: &TableConfig) -> Result<Self, Error> {
        let name = name.as_ref();
        let lock = if config.advisory_lock {
            Some(TableLock::acquire(&config.data_dir, name)?)
        } else {
            None
        };
        Ok(Self(Arc::new(Inner {
            table: RwLock::new(Table::new(name, config)),
            _lock: lock,
        })))
    }

    /// Shares the table for reading, for as long as the guard lives
    pub fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.0.table.read()
    }

    /// Takes the table exclusively, for as long as the guard lives
    pub fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.0.table.write()
    }
}

impl DynamicTable for SharedTable {
    fn name(&self) -> String {
        self.read().name().to_string()
    }

    fn schema(&self) -> Option<TableSchema> {
        self.read().schema().cloned()
    }

    fn set_columns(&self, names: &[&str]) -> Result<(), Error> {
        self.write().set_columns(names)
    }

    fn set_columns_typed(&self, names: &[&str], types: &[ColumnType]) -> Result<(), Error> {
        self.write().set_columns_typed(names, types)
    }

    fn reset_schema(&self, schema: TableSchema, clear_rows: bool) {
        self.write().reset_schema(schema, clear_rows)
    }

    fn column_type_of(&self, name: &str) -> Result<ColumnType, Error> {
        self.read().column_type_of(name)
    }

    fn has_column(&self, name: &str) -> bool {
        self.read().has_column(name)
    }

    fn column_count(&self) -> usize {
        self.read().column_count()
    }

    fn row_count(&self) -> usize {
        self.read().row_count()
    }

    fn insert_row(&self, row: Row) -> Result<(), Error> {
        self.write().insert_row(row)
    }

    fn select_all(&self) -> Vec<Record> {
        self.read().select_all()
    }

    fn load_from_disk(&self) -> Result<Vec<Record>, Error> {
        self.read().load_from_disk()
    }

    fn save(&self) -> Result<usize, Error> {
        self.write().save()
    }

    fn clear(&self) -> Result<(), Error> {
        self.write().clear()
    }

    fn clear_memory(&self) {
        self.write().clear_memory()
    }

    fn clear_disk(&self) -> Result<(), Error> {
        self.write().clear_disk()
    }

    fn select_where_from_memory(
        &self,
        column: &str,
        op: &str,
        value: &str,
    ) -> Result<Vec<Record>, Error> {
        self.read().select_where_from_memory(column, op, value)
    }

    fn select_where_from_disk(
        &self,
        column: &str,
        op: &str,
        value: &str,
    ) -> Result<Vec<Record>, Error> {
        self.read().select_where_from_disk(column, op, value)
    }

    fn select_where_multi(
        &self,
        conditions: &[Condition],
        source: Source,
    ) -> Result<Vec<Record>, Error> {
        self.read().select_where_multi(conditions, source)
    }

    fn update_where_from_memory(
        &self,
        column: &str,
        op: &str,
        value: &str,
        updates: &UpdateSet,
    ) -> Result<usize, Error> {
        self.write()
            .update_where_from_memory(column, op, value, updates)
    }

    fn update_where_from_disk(
        &self,
        column: &str,
        op: &str,
        value: &str,
        updates: &UpdateSet,
    ) -> Result<usize, Error> {
        self.write().update_where_from_disk(column, op, value, updates)
    }

    fn delete_where_from_memory(
        &self,
        column: &str,
        op: &str,
        value: &str,
    ) -> Result<usize, Error> {
        self.write().delete_where_from_memory(column, op, value)
    }

    fn delete_where_from_disk(&self, column: &str, op: &str, value: &str) -> Result<usize, Error> {
        self.write().delete_where_from_disk(column, op, value)
    }

    fn export_to_json(&self) -> Result<String, Error> {
        self.read().export_to_json()
    }

    fn export_to_json_from_disk(&self) -> Result<String, Error> {
        self.read().export_to_json_from_disk()
    }

    fn import_from_json(&self, text: &str) -> Result<usize, Error> {
        self.write().import_from_json(text)
    }

    fn import_from_json_to_disk(&self, text: &str, append: bool) -> Result<usize, Error> {
        self.write().import_from_json_to_disk(text, append)
    }

    fn append_log(
        &self,
        sensor_id: &str,
        timestamp_ms: u64,
        value: f64,
        faults: &[String],
    ) -> Result<(), Error> {
        self.write()
            .append_log(sensor_id, timestamp_ms, value, faults)
    }

    fn logs_snapshot(&self) -> Vec<LogEntry> {
        self.read().logs().to_vec()
    }

    fn load_logs_into_memory(&self) -> Result<usize, Error> {
        self.write().load_logs_into_memory()
    }
}

/// An exclusive advisory lock on a table, held until dropped
#[derive(Debug)]
pub struct TableLock {
    file: File,
    path: PathBuf,
}

impl TableLock {
    /// Locks the table `name` stored in `data_dir`, without blocking
    pub fn acquire<P: AsRef<Path>>(data_dir: P, name: &str) -> Result<Self, Error> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(format!("{name}.{LOCK_FILE_EXTENSION}"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                info!("locked table {name:?} at {path:?}");
                Ok(Self { file, path })
            }
            Err(e) if is_contended(&e) => Err(Error::TableLocked(path)),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for TableLock {
    fn drop(&mut self) {
        match self.file.unlock() {
            Ok(()) => debug!("unlocked {:?}", self.path),
            Err(e) => warn!("could not unlock {:?}: {e}", self.path),
        }
    }
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use tempfile::tempdir;
    use test_log::test;

    use crate::config::TableConfig;
    use crate::dynamic_table::DynamicTable;
    use crate::error::{Error, ErrorKind};
    use crate::tables::shared_table::SharedTable;
    use crate::tables::table::Table;

    #[test]
    fn second_open_is_refused() {
        let dir = tempdir().unwrap();
        let config = TableConfig::in_path(dir.path());
        let first = SharedTable::open("sensors", &config).unwrap();
        let second = SharedTable::open("sensors", &config).unwrap_err();
        assert!(matches!(second, Error::TableLocked(_)));
        assert_eq!(second.kind(), ErrorKind::Io);

        let other = SharedTable::open("readings", &config);
        assert!(other.is_ok());

        drop(first);
        SharedTable::open("sensors", &config).expect("lock released on drop");
    }

    #[test]
    fn unlocked_tables_can_be_opened_twice() {
        let dir = tempdir().unwrap();
        let mut config = TableConfig::in_path(dir.path());
        config.advisory_lock = false;
        let _first = SharedTable::open("sensors", &config).unwrap();
        let _second = SharedTable::open("sensors", &config).unwrap();
    }

    #[test]
    fn logger_and_reader_threads() {
        let dir = tempdir().unwrap();
        let table: Arc<dyn DynamicTable> =
            Arc::new(SharedTable::new(Table::new("log", &TableConfig::in_path(dir.path()))));

        let logger = {
            let table = table.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    table
                        .append_log("TEMP-001", i, i as f64 / 2.0, &[])
                        .unwrap();
                    if i % 50 == 0 {
                        table.save().unwrap();
                    }
                }
            })
        };
        for _ in 0..50 {
            let rows = table.select_all().len();
            let logs = table.logs_snapshot().len();
            assert!(rows <= 200 && logs <= 200);
            let _ = table.select_where_from_disk("timestamp_ms", ">=", "0").unwrap();
        }
        logger.join().unwrap();

        assert_eq!(table.row_count(), 200);
        assert_eq!(table.logs_snapshot().len(), 200);
        table.save().unwrap();
        assert_eq!(table.load_from_disk().unwrap().len(), 200);
    }
}

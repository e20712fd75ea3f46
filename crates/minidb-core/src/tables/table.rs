//! The table engine.
//!
//! A [`Table`] owns a schema, an in-memory row store, a buffer of structured
//! log entries and the file the table is persisted to. Memory and disk have
//! their own query paths: memory reads skip rows that don't fit the schema,
//! disk reads normalize them to the width of the file's header.
//!
//! Every write to the table file goes through
//! [`AtomicReplace`](crate::tables::atomic_replace::AtomicReplace), except for
//! json imports in append mode, which append directly.
//!
//! A table is not synchronized. Use a [`SharedTable`](crate::tables::shared_table::SharedTable)
//! to access one table from more than one thread.

use std::slice;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, instrument, trace, warn};

use crate::config::TableConfig;
use crate::data::row::{Record, Row, RowPolicy};
use crate::data::types::ColumnType;
use crate::error::Error;
use crate::interchange::json;
use crate::logs::{log_schema, LogEntry};
use crate::queries::comparator::Filter;
use crate::queries::condition::{Condition, UpdateSet};
use crate::tables::atomic_replace::Staged;
use crate::tables::file_table::TableFile;
use crate::tables::table_schema::{same_key_set, TableSchema};

/// Where a query reads its rows from
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Source {
    #[default]
    Memory,
    Disk,
}

/// A named table
#[derive(Debug)]
pub struct Table {
    name: String,
    schema: Option<TableSchema>,
    rows: Vec<Row>,
    logs: Vec<LogEntry>,
    file: TableFile,
}

impl Table {
    /// Creates a new table with no schema. Nothing is read from or written to
    /// disk until asked for.
    pub fn new(name: impl AsRef<str>, config: &TableConfig) -> Self {
        let name = name.as_ref().to_string();
        let file = TableFile::new(config, &name);
        Self {
            name,
            schema: None,
            rows: vec![],
            logs: vec![],
            file,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file this table is persisted to
    pub fn file(&self) -> &TableFile {
        &self.file
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    /// Sets the columns of this table, all of type string. Existing rows are kept.
    pub fn set_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), Error> {
        self.reset_schema(TableSchema::new(names)?, false);
        Ok(())
    }

    /// Sets the columns of this table and their types. Existing rows are kept.
    pub fn set_columns_typed<S: AsRef<str>>(
        &mut self,
        names: &[S],
        types: &[ColumnType],
    ) -> Result<(), Error> {
        self.reset_schema(TableSchema::typed(names, types)?, false);
        Ok(())
    }

    /// Replaces the schema of this table.
    ///
    /// Unless `clear_rows` is set the row store is left as it is, so rows
    /// stored under the old schema stay around. Rows whose width no longer
    /// matches are invisible to memory reads.
    pub fn reset_schema(&mut self, schema: TableSchema, clear_rows: bool) {
        if clear_rows {
            self.rows.clear();
        } else {
            let orphaned = self
                .rows
                .iter()
                .filter(|row| !RowPolicy::Strict.accepts(row, schema.len()))
                .count();
            if orphaned > 0 {
                warn!(
                    "{orphaned} rows of table {:?} do not fit its new schema",
                    self.name
                );
            }
        }
        debug!("table {:?} now has columns {:?}", self.name, schema.names());
        self.schema = Some(schema);
    }

    /// Gets the type of a column
    pub fn column_type_of(&self, name: &str) -> Result<ColumnType, Error> {
        self.schema
            .as_ref()
            .ok_or_else(|| Error::NoColumnFound(name.to_string()))?
            .column_type(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema
            .as_ref()
            .map_or(false, |schema| schema.has_column(name))
    }

    pub fn column_count(&self) -> usize {
        self.schema.as_ref().map_or(0, TableSchema::len)
    }

    /// The number of rows in memory, including rows that don't fit the schema
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Appends a row to the row store
    pub fn insert_row<R: Into<Row>>(&mut self, values: R) -> Result<(), Error> {
        let schema = self.schema.as_ref().ok_or(Error::NoSchema)?;
        let row = values.into();
        if row.len() != schema.len() {
            return Err(Error::BadColumnCount {
                expected: schema.len(),
                actual: row.len(),
            });
        }
        trace!("inserting {row:?} into {:?}", self.name);
        self.rows.push(row);
        Ok(())
    }

    /// Gets every row in memory that fits the schema
    pub fn select_all(&self) -> Vec<Record> {
        match &self.schema {
            Some(schema) => {
                let names = schema.names();
                self.fitting_rows(schema)
                    .map(|row| row.to_record(&names))
                    .collect()
            }
            None => vec![],
        }
    }

    /// Reads every row of the table file, mapped to the file's own header.
    /// A missing file reads as an empty table.
    pub fn load_from_disk(&self) -> Result<Vec<Record>, Error> {
        Ok(self
            .file
            .read()?
            .map(|disk| disk.records())
            .unwrap_or_default())
    }

    /// Writes the schema and every row in memory to the table file, returning
    /// the number of rows written
    #[instrument(skip(self), fields(table = %self.name), err)]
    pub fn save(&self) -> Result<usize, Error> {
        let schema = self.schema.as_ref().ok_or(Error::NoSchema)?;
        self.file.overwrite(&schema.names(), &self.rows)
    }

    /// Empties the row store and truncates the table file to just its header
    #[instrument(skip(self), fields(table = %self.name), err)]
    pub fn clear(&mut self) -> Result<(), Error> {
        let schema = self.schema.as_ref().ok_or(Error::NoSchema)?;
        self.file.overwrite(&schema.names(), &[])?;
        self.rows.clear();
        Ok(())
    }

    /// Empties the row store and the log buffer, without touching the table file
    pub fn clear_memory(&mut self) {
        self.rows.clear();
        self.logs.clear();
    }

    /// Truncates the table file to just its header. Without a schema, the file
    /// is removed instead.
    #[instrument(skip(self), fields(table = %self.name), err)]
    pub fn clear_disk(&self) -> Result<(), Error> {
        match &self.schema {
            Some(schema) => {
                self.file.overwrite(&schema.names(), &[])?;
            }
            None => {
                if self.file.remove()? {
                    debug!("removed {:?}", self.file.path());
                }
            }
        }
        Ok(())
    }

    pub fn select_where_from_memory(
        &self,
        column: &str,
        op: &str,
        value: &str,
    ) -> Result<Vec<Record>, Error> {
        let condition = Condition::new(column, op, value)?;
        self.select_where_multi(slice::from_ref(&condition), Source::Memory)
    }

    pub fn select_where_from_disk(
        &self,
        column: &str,
        op: &str,
        value: &str,
    ) -> Result<Vec<Record>, Error> {
        let condition = Condition::new(column, op, value)?;
        self.select_where_multi(slice::from_ref(&condition), Source::Disk)
    }

    /// Selects the rows matching every condition. With no conditions, every row
    /// of the source is selected.
    pub fn select_where_multi(
        &self,
        conditions: &[Condition],
        source: Source,
    ) -> Result<Vec<Record>, Error> {
        match source {
            Source::Memory => {
                let Some(schema) = self.queried_schema(conditions)? else {
                    return Ok(vec![]);
                };
                let filter = memory_filter(schema, conditions)?;
                let names = schema.names();
                Ok(self
                    .fitting_rows(schema)
                    .filter(|row| filter.matches(row))
                    .map(|row| row.to_record(&names))
                    .collect())
            }
            Source::Disk => {
                let Some(disk) = self.file.read()? else {
                    return Ok(vec![]);
                };
                if disk.header().is_empty() {
                    return Ok(vec![]);
                }
                let filter = self.disk_filter(conditions, disk.header())?;
                Ok(disk
                    .rows()
                    .iter()
                    .filter(|row| filter.matches(row))
                    .map(|row| row.to_record(disk.header()))
                    .collect())
            }
        }
    }

    /// Overwrites cells of every matching row in memory, returning the number of
    /// rows updated
    pub fn update_where_from_memory(
        &mut self,
        column: &str,
        op: &str,
        value: &str,
        updates: &UpdateSet,
    ) -> Result<usize, Error> {
        let condition = Condition::new(column, op, value)?;
        let schema = self
            .schema
            .as_ref()
            .ok_or_else(|| Error::NoColumnFound(condition.column().to_string()))?;
        let assignments = resolve_updates(updates, |col| schema.col_idx(col))?;
        let filter = memory_filter(schema, slice::from_ref(&condition))?;
        let width = schema.len();

        let mut updated = 0;
        for row in &mut self.rows {
            if RowPolicy::Strict.accepts(row, width) && filter.matches(row) {
                for (index, cell) in &assignments {
                    row[*index] = cell.clone();
                }
                updated += 1;
            }
        }
        debug!("updated {updated} rows in memory");
        Ok(updated)
    }

    /// Removes every matching row from memory, returning the number of rows removed
    pub fn delete_where_from_memory(
        &mut self,
        column: &str,
        op: &str,
        value: &str,
    ) -> Result<usize, Error> {
        let condition = Condition::new(column, op, value)?;
        let schema = self
            .schema
            .as_ref()
            .ok_or_else(|| Error::NoColumnFound(condition.column().to_string()))?;
        let filter = memory_filter(schema, slice::from_ref(&condition))?;
        let width = schema.len();

        let before = self.rows.len();
        self.rows
            .retain(|row| !(RowPolicy::Strict.accepts(row, width) && filter.matches(row)));
        let deleted = before - self.rows.len();
        debug!("deleted {deleted} rows from memory");
        Ok(deleted)
    }

    /// Overwrites cells of every matching row in the table file, returning the
    /// number of rows updated. The file is left alone if nothing matches or
    /// there is no file.
    #[instrument(skip(self, updates), fields(table = %self.name), err)]
    pub fn update_where_from_disk(
        &self,
        column: &str,
        op: &str,
        value: &str,
        updates: &UpdateSet,
    ) -> Result<usize, Error> {
        let condition = Condition::new(column, op, value)?;
        self.file.replacer().run(|source, writer| {
            let Some(mut records) = source else {
                debug!("no table file to update");
                return Ok(Staged::Abort(0));
            };
            let header = match records.next() {
                Some(header) => header?.into_cells(),
                None => return Ok(Staged::Abort(0)),
            };
            let filter = self.disk_filter(slice::from_ref(&condition), &header)?;
            let assignments =
                resolve_updates(updates, |col| header.iter().position(|h| h == col))?;

            writer.write_record(header.iter())?;
            let mut updated = 0;
            for row in records {
                let mut row = row?.fit_to(header.len());
                if filter.matches(&row) {
                    for (index, cell) in &assignments {
                        row[*index] = cell.clone();
                    }
                    updated += 1;
                }
                writer.write_record(row.iter())?;
            }
            debug!("updated {updated} rows on disk");
            Ok(if updated > 0 {
                Staged::Commit(updated)
            } else {
                Staged::Abort(0)
            })
        })
    }

    /// Removes every matching row from the table file, returning the number of
    /// rows removed. The file is left alone if nothing matches or there is no file.
    #[instrument(skip(self), fields(table = %self.name), err)]
    pub fn delete_where_from_disk(
        &self,
        column: &str,
        op: &str,
        value: &str,
    ) -> Result<usize, Error> {
        let condition = Condition::new(column, op, value)?;
        self.file.replacer().run(|source, writer| {
            let Some(mut records) = source else {
                debug!("no table file to delete from");
                return Ok(Staged::Abort(0));
            };
            let header = match records.next() {
                Some(header) => header?.into_cells(),
                None => return Ok(Staged::Abort(0)),
            };
            let filter = self.disk_filter(slice::from_ref(&condition), &header)?;

            writer.write_record(header.iter())?;
            let mut deleted = 0;
            for row in records {
                let row = row?.fit_to(header.len());
                if filter.matches(&row) {
                    deleted += 1;
                } else {
                    writer.write_record(row.iter())?;
                }
            }
            debug!("deleted {deleted} rows on disk");
            Ok(if deleted > 0 {
                Staged::Commit(deleted)
            } else {
                Staged::Abort(0)
            })
        })
    }

    /// Exports every row in memory that fits the schema as json
    pub fn export_to_json(&self) -> Result<String, Error> {
        json::to_json(&self.select_all())
    }

    /// Exports every row of the table file as json
    pub fn export_to_json_from_disk(&self) -> Result<String, Error> {
        json::to_json(&self.load_from_disk()?)
    }

    /// Imports a json array of objects into memory, returning the number of rows
    /// imported.
    ///
    /// If this table has no schema, one is inferred from the keys of the first
    /// object. Otherwise every object must have exactly the schema's columns as
    /// keys. Nothing is imported unless every object is valid.
    #[instrument(skip_all, fields(table = %self.name), err)]
    pub fn import_from_json(&mut self, text: &str) -> Result<usize, Error> {
        let objects = json::parse_objects(text)?;
        let schema = match &self.schema {
            Some(schema) => schema.clone(),
            None => TableSchema::new(&json::keys(&objects[0]))?,
        };
        let names = schema.names();
        let rows = objects
            .iter()
            .map(|object| {
                let keys = json::keys(object);
                if schema.matches_names(&keys) {
                    Ok(json::project(object, &names))
                } else {
                    Err(Error::SchemaMismatch {
                        expected: names.iter().map(|name| name.to_string()).collect(),
                        actual: keys,
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        if self.schema.is_none() {
            debug!("inferred columns {:?}", schema.names());
            self.schema = Some(schema);
        }
        let imported = rows.len();
        self.rows.extend(rows);
        debug!("imported {imported} rows into memory");
        Ok(imported)
    }

    /// Imports a json array of objects into the table file, returning the number
    /// of rows written.
    ///
    /// Without `append` the file is replaced by the imported rows, under a header
    /// taken from the keys of the first object. With `append` the rows are added
    /// to the end of the file, and every object must have exactly the existing
    /// header's columns as keys.
    #[instrument(skip(self, text), fields(table = %self.name), err)]
    pub fn import_from_json_to_disk(&self, text: &str, append: bool) -> Result<usize, Error> {
        let objects = json::parse_objects(text)?;
        let existing = if append {
            self.file
                .read_header()?
                .filter(|header| !header.is_empty())
        } else {
            None
        };

        match existing {
            Some(header) => {
                if let Some(object) = objects
                    .iter()
                    .find(|object| !same_key_set(&header, &json::keys(object)))
                {
                    return Err(Error::SchemaMismatch {
                        expected: header,
                        actual: json::keys(object),
                    });
                }
                let rows = project_all(&objects, &header);
                self.file.append(&header, &rows)
            }
            None => {
                let header = json::keys(&objects[0]);
                if header.is_empty() {
                    return Err(Error::json_format("first element has no fields"));
                }
                let rows = project_all(&objects, &header);
                if append {
                    self.file.append(&header, &rows)
                } else {
                    self.file.overwrite(&header, &rows)
                }
            }
        }
    }

    /// Records a sensor reading as a row, and keeps it in the log buffer.
    ///
    /// A table without a schema is given the log schema first.
    pub fn append_log<S: AsRef<str>>(
        &mut self,
        sensor_id: &str,
        timestamp_ms: u64,
        value: f64,
        faults: &[S],
    ) -> Result<(), Error> {
        if self.schema.is_none() {
            self.reset_schema(log_schema(), false);
        }
        let entry = LogEntry::new(sensor_id, timestamp_ms, value, faults);
        self.insert_row(entry.to_row())?;
        self.logs.push(entry);
        Ok(())
    }

    /// The log buffer
    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Replaces the log buffer with the entries found in the table file,
    /// returning how many were loaded. Rows that can't be read as log entries
    /// are skipped.
    #[instrument(skip(self), fields(table = %self.name), err)]
    pub fn load_logs_into_memory(&mut self) -> Result<usize, Error> {
        let disk = self.file.read_unfitted()?.unwrap_or_default();
        let mut logs = Vec::with_capacity(disk.rows().len());
        for row in disk.rows() {
            match LogEntry::from_disk_row(disk.header(), row.clone()) {
                Some(entry) => logs.push(entry),
                None => warn!("skipping row that is not a log entry: {row:?}"),
            }
        }
        self.logs = logs;
        debug!("loaded {} log entries", self.logs.len());
        Ok(self.logs.len())
    }

    /// Rows in memory whose width matches the schema
    fn fitting_rows<'a>(&'a self, schema: &TableSchema) -> impl Iterator<Item = &'a Row> {
        let width = schema.len();
        self.rows
            .iter()
            .filter(move |row| RowPolicy::Strict.accepts(row, width))
    }

    /// The schema queried by conditions. Without a schema every condition
    /// refers to a missing column.
    fn queried_schema(&self, conditions: &[Condition]) -> Result<Option<&TableSchema>, Error> {
        match (&self.schema, conditions.first()) {
            (Some(schema), _) => Ok(Some(schema)),
            (None, Some(condition)) => Err(Error::NoColumnFound(condition.column().to_string())),
            (None, None) => Ok(None),
        }
    }

    /// Builds a filter over rows laid out along a file header. Columns take
    /// their type from the schema when it has them, otherwise from the literal
    /// they are compared to.
    fn disk_filter<S: AsRef<str>>(
        &self,
        conditions: &[Condition],
        header: &[S],
    ) -> Result<Filter, Error> {
        Filter::new(conditions, |condition| {
            let index = header
                .iter()
                .position(|col| col.as_ref() == condition.column())
                .ok_or_else(|| Error::NoColumnFound(condition.column().to_string()))?;
            let column_type = self
                .schema
                .as_ref()
                .and_then(|schema| schema.column_type(condition.column()).ok())
                .unwrap_or_else(|| ColumnType::infer(condition.value()));
            Ok((index, column_type))
        })
    }
}

fn memory_filter(schema: &TableSchema, conditions: &[Condition]) -> Result<Filter, Error> {
    Filter::new(conditions, |condition| {
        let index = schema
            .col_idx(condition.column())
            .ok_or_else(|| Error::NoColumnFound(condition.column().to_string()))?;
        Ok((index, schema.columns()[index].data_type()))
    })
}

/// Resolves the columns of an update set to positions
fn resolve_updates<F>(updates: &UpdateSet, mut col_idx: F) -> Result<Vec<(usize, String)>, Error>
where
    F: FnMut(&str) -> Option<usize>,
{
    updates
        .iter()
        .map(|(col, cell)| {
            col_idx(col)
                .map(|index| (index, cell.clone()))
                .ok_or_else(|| Error::NoColumnFound(col.clone()))
        })
        .collect()
}

fn project_all(objects: &[json::JsonObject], header: &[String]) -> Vec<Row> {
    objects
        .iter()
        .map(|object| json::project(object, header))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;
    use test_log::test;

    use crate::config::TableConfig;
    use crate::data::types::ColumnType;
    use crate::error::ErrorKind;
    use crate::queries::condition::{Condition, UpdateSet};
    use crate::tables::file_table::TableFile;
    use crate::tables::table::{Source, Table};
    use crate::tables::table_schema::TableSchema;
    use crate::tables::wire::WireFormat;

    fn people(config: &TableConfig) -> Table {
        let mut table = Table::new("people", config);
        table.set_columns(&["Name", "Age"]).unwrap();
        table.insert_row(["Alice", "30"]).unwrap();
        table.insert_row(["Bob", "25"]).unwrap();
        table.insert_row(["Charlie", "30"]).unwrap();
        table
    }

    #[test]
    fn insert_checks_schema_and_width() {
        let dir = tempdir().unwrap();
        let mut table = Table::new("t", &TableConfig::in_path(dir.path()));
        assert_eq!(table.insert_row(["a"]).unwrap_err().kind(), ErrorKind::Schema);
        table.set_columns(&["a", "b"]).unwrap();
        assert_eq!(
            table.insert_row(["a"]).unwrap_err().kind(),
            ErrorKind::Cardinality
        );
        table.insert_row(["1", "2"]).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 2);
        assert!(table.has_column("b"));
        assert_eq!(table.column_type_of("a").unwrap(), ColumnType::String);
        assert_eq!(
            table.column_type_of("c").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn memory_reads_skip_orphaned_rows() {
        let dir = tempdir().unwrap();
        let mut table = people(&TableConfig::in_path(dir.path()));
        table.set_columns(&["Name", "Age", "City"]).unwrap();
        table.insert_row(["Dana", "41", "Oslo"]).unwrap();

        assert_eq!(table.row_count(), 4);
        let all = table.select_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["City"], "Oslo");

        table.reset_schema(TableSchema::new(&["Name"]).unwrap(), true);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn update_in_memory() {
        let dir = tempdir().unwrap();
        let mut table = people(&TableConfig::in_path(dir.path()));
        let updates = UpdateSet::from([("Name".to_string(), "Updated".to_string())]);
        assert_eq!(
            table
                .update_where_from_memory("Age", "==", "30", &updates)
                .unwrap(),
            2
        );
        let names = table
            .select_all()
            .into_iter()
            .map(|record| record["Name"].clone())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Updated", "Bob", "Updated"]);

        let bad = UpdateSet::from([("Email".to_string(), "x".to_string())]);
        assert_eq!(
            table
                .update_where_from_memory("Age", "==", "30", &bad)
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn typed_comparisons_in_memory() {
        let dir = tempdir().unwrap();
        let mut table = Table::new("readings", &TableConfig::in_path(dir.path()));
        table
            .set_columns_typed(&["id", "temp"], &[ColumnType::Int, ColumnType::Float])
            .unwrap();
        table.insert_row(["1", "20.5"]).unwrap();
        table.insert_row(["2", "bad"]).unwrap();
        table.insert_row(["10", "30"]).unwrap();

        assert_eq!(table.select_where_from_memory("id", ">", "2").unwrap().len(), 1);
        assert_eq!(table.select_where_from_memory("temp", ">=", "20").unwrap().len(), 2);
        assert_eq!(
            table
                .select_where_from_memory("id", "~", "2")
                .unwrap_err()
                .kind(),
            ErrorKind::Operator
        );
        assert_eq!(
            table
                .select_where_from_memory("missing", "==", "2")
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn delete_in_memory() {
        let dir = tempdir().unwrap();
        let mut table = people(&TableConfig::in_path(dir.path()));
        assert_eq!(table.delete_where_from_memory("Name", "==", "Zed").unwrap(), 0);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.delete_where_from_memory("Age", "!=", "30").unwrap(), 1);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn disk_update_and_delete() {
        let dir = tempdir().unwrap();
        let table = people(&TableConfig::in_path(dir.path()));
        table.save().unwrap();

        let updates = UpdateSet::from([("Age".to_string(), "31".to_string())]);
        assert_eq!(
            table
                .update_where_from_disk("Name", "==", "Alice", &updates)
                .unwrap(),
            1
        );
        assert_eq!(table.delete_where_from_disk("Name", "==", "Bob").unwrap(), 1);
        assert_eq!(
            fs::read_to_string(table.file().path()).unwrap(),
            "Name,Age\nAlice,31\nCharlie,30\n"
        );
        assert!(!table.file().staging_path().exists());
    }

    #[test]
    fn disk_mutations_without_a_file() {
        let dir = tempdir().unwrap();
        let table = Table::new("absent", &TableConfig::in_path(dir.path()));
        assert_eq!(table.delete_where_from_disk("a", "==", "1").unwrap(), 0);
        assert_eq!(
            table
                .update_where_from_disk("a", "==", "1", &UpdateSet::new())
                .unwrap(),
            0
        );
        assert!(!table.file().exists());
        assert!(table.load_from_disk().unwrap().is_empty());
        assert!(table.select_where_from_disk("a", "==", "1").unwrap().is_empty());
    }

    #[test]
    fn disk_types_come_from_schema_or_literal() {
        let dir = tempdir().unwrap();
        let config = TableConfig::in_path(dir.path());
        fs::write(TableFile::new(&config, "nums").path(), "n,label\n9,x\n10,y\n").unwrap();

        let untyped = Table::new("nums", &config);
        assert_eq!(untyped.select_where_from_disk("n", ">", "9").unwrap().len(), 1);

        let mut typed = Table::new("nums", &config);
        typed.set_columns(&["n", "label"]).unwrap();
        assert_eq!(
            typed.select_where_from_disk("n", ">", "9").unwrap_err().kind(),
            ErrorKind::Operator
        );
    }

    #[test]
    fn multi_condition_select() {
        let dir = tempdir().unwrap();
        let mut table = Table::new("readings", &TableConfig::in_path(dir.path()));
        table
            .set_columns_typed(&["sensor", "value"], &[ColumnType::String, ColumnType::Float])
            .unwrap();
        table.insert_row(["a", "1.5"]).unwrap();
        table.insert_row(["a", "7"]).unwrap();
        table.insert_row(["b", "9"]).unwrap();
        table.save().unwrap();

        let conditions = [
            "sensor == a".parse::<Condition>().unwrap(),
            "value > 2".parse::<Condition>().unwrap(),
        ];
        for source in [Source::Memory, Source::Disk] {
            let found = table.select_where_multi(&conditions, source).unwrap();
            assert_eq!(found.len(), 1, "from {source}");
            assert_eq!(found[0]["value"], "7");
            assert_eq!(table.select_where_multi(&[], source).unwrap().len(), 3);
        }
    }

    #[test]
    fn clears() {
        let dir = tempdir().unwrap();
        let mut table = people(&TableConfig::in_path(dir.path()));
        table.save().unwrap();

        table.clear_disk().unwrap();
        assert_eq!(fs::read_to_string(table.file().path()).unwrap(), "Name,Age\n");
        assert_eq!(table.row_count(), 3);

        table.clear().unwrap();
        assert_eq!(table.row_count(), 0);

        let schemaless = Table::new("people", &TableConfig::in_path(dir.path()));
        schemaless.clear_disk().unwrap();
        assert!(!schemaless.file().exists());
    }

    #[test]
    fn save_needs_schema() {
        let dir = tempdir().unwrap();
        let table = Table::new("t", &TableConfig::in_path(dir.path()));
        assert_eq!(table.save().unwrap_err().kind(), ErrorKind::Schema);
        assert_eq!(table.export_to_json().unwrap(), "[]");
    }

    #[test]
    fn json_import_is_all_or_nothing() {
        let dir = tempdir().unwrap();
        let mut table = Table::new("t", &TableConfig::in_path(dir.path()));
        table.set_columns(&["a", "b"]).unwrap();
        let err = table
            .import_from_json(r#"[{"a":"1","b":"2"},{"a":"3"}]"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(table.row_count(), 0);

        assert_eq!(
            table
                .import_from_json(r#"[{"b":"2","a":"1"}]"#)
                .unwrap(),
            1
        );
        assert_eq!(table.select_all()[0]["a"], "1");
    }

    #[test]
    fn json_overwrite_to_disk() {
        let dir = tempdir().unwrap();
        let table = Table::new("t", &TableConfig::in_path(dir.path()));
        let written = table
            .import_from_json_to_disk(r#"[{"a":"1","b":"2"},{"b":"4","c":"5"}]"#, false)
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(table.file().path()).unwrap(), "a,b\n1,2\n,4\n");
        assert!(!table.file().staging_path().exists());
    }

    #[test]
    fn log_facade() {
        let dir = tempdir().unwrap();
        let mut table = Table::new("sensor_log", &TableConfig::in_path(dir.path()));
        table.append_log("TEMP-001", 1000, 21.5, &["SPIKE"]).unwrap();
        table
            .append_log::<&str>("TEMP-002", 1001, 19.0, &[])
            .unwrap();
        assert_eq!(table.column_type_of("value").unwrap(), ColumnType::Float);
        assert_eq!(table.logs().len(), 2);
        table.save().unwrap();

        table.clear_memory();
        assert!(table.logs().is_empty());
        assert_eq!(table.load_logs_into_memory().unwrap(), 2);
        assert_eq!(table.logs()[0].faults, ["SPIKE"]);
        assert!(table.logs()[1].faults.is_empty());
        assert_eq!(
            fs::read_to_string(table.file().path()).unwrap(),
            "timestamp_ms,sensor_id,value,fault_flags\n1000,TEMP-001,21.5,SPIKE\n1001,TEMP-002,19,-\n"
        );
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn every_fault_survives_a_reload() {
        for format in [WireFormat::Plain, WireFormat::Quoted] {
            let dir = tempdir().unwrap();
            let config = TableConfig::in_path(dir.path()).with_wire_format(format);
            let mut table = Table::new("sensor_log", &config);
            table
                .append_log("TEMP-001", 1000, 21.5, &["STUCK", "NOISE"])
                .unwrap();
            table.save().unwrap();

            table.clear_memory();
            assert_eq!(table.load_logs_into_memory().unwrap(), 1);
            assert_eq!(table.logs()[0].faults, ["STUCK", "NOISE"], "{format}");
            assert_eq!(table.logs()[0].value, 21.5);
        }
    }
}

//! The interface collaborators use to reach a table

use crate::data::row::{Record, Row};
use crate::data::types::ColumnType;
use crate::error::Error;
use crate::logs::LogEntry;
use crate::queries::condition::{Condition, UpdateSet};
use crate::tables::table::Source;
use crate::tables::table_schema::TableSchema;

/// A table that can be used from any thread. Every operation is atomic with
/// respect to every other operation on the same table.
pub trait DynamicTable: Send + Sync {
    /// The table's name
    fn name(&self) -> String;

    /// Gets a copy of the schema, if one is set
    fn schema(&self) -> Option<TableSchema>;

    fn set_columns(&self, names: &[&str]) -> Result<(), Error>;

    fn set_columns_typed(&self, names: &[&str], types: &[ColumnType]) -> Result<(), Error>;

    /// Replaces the schema, optionally dropping every row in memory
    fn reset_schema(&self, schema: TableSchema, clear_rows: bool);

    fn column_type_of(&self, name: &str) -> Result<ColumnType, Error>;

    fn has_column(&self, name: &str) -> bool;

    fn column_count(&self) -> usize;

    fn row_count(&self) -> usize;

    fn insert_row(&self, row: Row) -> Result<(), Error>;

    fn select_all(&self) -> Vec<Record>;

    fn load_from_disk(&self) -> Result<Vec<Record>, Error>;

    fn save(&self) -> Result<usize, Error>;

    fn clear(&self) -> Result<(), Error>;

    fn clear_memory(&self);

    fn clear_disk(&self) -> Result<(), Error>;

    fn select_where_from_memory(
        &self,
        column: &str,
        op: &str,
        value: &str,
    ) -> Result<Vec<Record>, Error>;

    fn select_where_from_disk(&self, column: &str, op: &str, value: &str)
        -> Result<Vec<Record>, Error>;

    /// Selects rows matching every condition
    fn select_where_multi(
        &self,
        conditions: &[Condition],
        source: Source,
    ) -> Result<Vec<Record>, Error>;

    fn update_where_from_memory(
        &self,
        column: &str,
        op: &str,
        value: &str,
        updates: &UpdateSet,
    ) -> Result<usize, Error>;

    fn update_where_from_disk(
        &self,
        column: &str,
        op: &str,
        value: &str,
        updates: &UpdateSet,
    ) -> Result<usize, Error>;

    fn delete_where_from_memory(&self, column: &str, op: &str, value: &str)
        -> Result<usize, Error>;

    fn delete_where_from_disk(&self, column: &str, op: &str, value: &str) -> Result<usize, Error>;

    fn export_to_json(&self) -> Result<String, Error>;

    fn export_to_json_from_disk(&self) -> Result<String, Error>;

    fn import_from_json(&self, text: &str) -> Result<usize, Error>;

    fn import_from_json_to_disk(&self, text: &str, append: bool) -> Result<usize, Error>;

    /// Records a sensor reading as a row and in the log buffer, as one step
    fn append_log(
        &self,
        sensor_id: &str,
        timestamp_ms: u64,
        value: f64,
        faults: &[String],
    ) -> Result<(), Error>;

    /// Gets a copy of the log buffer
    fn logs_snapshot(&self) -> Vec<LogEntry>;

    fn load_logs_into_memory(&self) -> Result<usize, Error>;
}

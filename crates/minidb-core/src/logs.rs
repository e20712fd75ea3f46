//! Structured sensor logs stored as table rows.
//!
//! A log table has four columns: `timestamp_ms`, `sensor_id`, `value` and
//! `fault_flags`. Faults are stored comma joined, or as `-` when there are none.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::data::row::{Record, Row};
use crate::data::types::ColumnType;
use crate::tables::table_schema::TableSchema;

pub const TIMESTAMP_COLUMN: &str = "timestamp_ms";
pub const SENSOR_ID_COLUMN: &str = "sensor_id";
pub const VALUE_COLUMN: &str = "value";
pub const FAULT_FLAGS_COLUMN: &str = "fault_flags";

/// Stored in place of an empty fault list
pub const NO_FAULTS: &str = "-";

/// The schema installed on a table that receives logs before it has a schema
pub fn log_schema() -> TableSchema {
    TableSchema::from_static(&[
        (TIMESTAMP_COLUMN, ColumnType::Int),
        (SENSOR_ID_COLUMN, ColumnType::String),
        (VALUE_COLUMN, ColumnType::Float),
        (FAULT_FLAGS_COLUMN, ColumnType::String),
    ])
}

/// A single sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp_ms: u64,
    pub sensor_id: String,
    pub value: f64,
    pub faults: Vec<String>,
}

impl LogEntry {
    pub fn new<S: AsRef<str>>(
        sensor_id: impl AsRef<str>,
        timestamp_ms: u64,
        value: f64,
        faults: &[S],
    ) -> Self {
        Self {
            timestamp_ms,
            sensor_id: sensor_id.as_ref().to_string(),
            value,
            faults: faults.iter().map(|f| f.as_ref().to_string()).collect(),
        }
    }

    /// The faults as they are stored in the `fault_flags` column
    pub fn fault_flags(&self) -> String {
        if self.faults.is_empty() {
            NO_FAULTS.to_string()
        } else {
            self.faults.iter().join(",")
        }
    }

    /// Lays this entry out along the log columns
    pub fn to_row(&self) -> Row {
        Row::from(vec![
            self.timestamp_ms.to_string(),
            self.sensor_id.clone(),
            self.value.to_string(),
            self.fault_flags(),
        ])
    }

    /// Reads an entry back out of a row of a table file laid out along `header`.
    ///
    /// Faults are joined with the cell delimiter, so in the plain format an
    /// entry with more than one fault is written as extra cells. When
    /// `fault_flags` is the last column, those cells are joined back into it.
    pub fn from_disk_row<S: AsRef<str>>(header: &[S], row: Row) -> Option<Self> {
        let width = header.len();
        let flags_last = header
            .last()
            .map_or(false, |col| col.as_ref() == FAULT_FLAGS_COLUMN);
        let row = if flags_last && row.len() > width {
            let mut cells = row.into_cells();
            let flags = cells.split_off(width - 1).join(",");
            cells.push(flags);
            Row::from(cells)
        } else {
            row.fit_to(width)
        };
        Self::from_record(&row.to_record(header))
    }

    /// Reads an entry back out of a record. Returns `None` if a column is
    /// missing or the timestamp or value can't be parsed.
    pub fn from_record(record: &Record) -> Option<Self> {
        let timestamp_ms = record.get(TIMESTAMP_COLUMN)?.trim().parse().ok()?;
        let sensor_id = record.get(SENSOR_ID_COLUMN)?.clone();
        let value = record.get(VALUE_COLUMN)?.trim().parse().ok()?;
        let faults = match record.get(FAULT_FLAGS_COLUMN).map(String::as_str) {
            None | Some("") | Some(NO_FAULTS) => vec![],
            Some(flags) => flags.split(',').map(str::to_string).collect(),
        };
        Some(Self {
            timestamp_ms,
            sensor_id,
            value,
            faults,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::data::row::Row;
    use crate::logs::{log_schema, LogEntry};

    #[test]
    fn fault_flags() {
        let entry = LogEntry::new("TEMP-001", 1000, 21.5, &["STUCK", "NOISE"]);
        assert_eq!(entry.fault_flags(), "STUCK,NOISE");
        assert_eq!(entry.to_row(), Row::from(["1000", "TEMP-001", "21.5", "STUCK,NOISE"]));

        let none: [&str; 0] = [];
        let clean = LogEntry::new("TEMP-001", 1000, 21.0, &none);
        assert_eq!(clean.fault_flags(), "-");
        assert_eq!(clean.to_row()[2], "21");
    }

    #[test]
    fn parse_back_from_record() {
        let schema = log_schema();
        let row = Row::from(["1000", "PRESS-7", "3.25", "DRIFT,SPIKE"]);
        let entry = LogEntry::from_record(&row.to_record(&schema.names())).unwrap();
        assert_eq!(entry, LogEntry::new("PRESS-7", 1000, 3.25, &["DRIFT", "SPIKE"]));

        let dash = Row::from(["5", "PRESS-7", "1", "-"]);
        assert!(LogEntry::from_record(&dash.to_record(&schema.names()))
            .unwrap()
            .faults
            .is_empty());
    }

    #[test]
    fn overflowing_faults_are_rejoined() {
        let schema = log_schema();
        let header = schema.names();
        let row = Row::from(["1000", "TEMP-001", "21.5", "STUCK", "NOISE", "DRIFT"]);
        let entry = LogEntry::from_disk_row(&header, row).unwrap();
        assert_eq!(entry.faults, ["STUCK", "NOISE", "DRIFT"]);

        let short = Row::from(["1000", "TEMP-001", "21.5"]);
        assert!(LogEntry::from_disk_row(&header, short).unwrap().faults.is_empty());
    }

    #[test]
    fn overflow_is_dropped_when_faults_are_not_last() {
        let header = ["fault_flags", "timestamp_ms", "sensor_id", "value"];
        let row = Row::from(["STUCK", "1000", "TEMP-001", "21.5", "extra"]);
        let entry = LogEntry::from_disk_row(&header, row).unwrap();
        assert_eq!(entry.faults, ["STUCK"]);
        assert_eq!(entry.value, 21.5);
    }

    #[test]
    fn malformed_records_are_rejected() {
        let schema = log_schema();
        let bad_time = Row::from(["soon", "PRESS-7", "1", "-"]);
        assert!(LogEntry::from_record(&bad_time.to_record(&schema.names())).is_none());
        let short = Row::from(["5", "PRESS-7"]);
        assert!(LogEntry::from_record(&short.to_record(&schema.names())).is_none());
    }
}

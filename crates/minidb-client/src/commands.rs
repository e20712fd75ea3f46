//! The commands the client can run against a table

use std::io::Write;
use std::time::Instant;

use log::{debug, info};
use minidb_core::dynamic_table::DynamicTable;
use minidb_core::queries::condition::{Condition, UpdateSet};
use minidb_core::tables::{SharedTable, Source};

use crate::write_rows::{write_affected, write_rows};

/// Prints every row of a table
pub fn show<W: Write>(table: &SharedTable, write: W) -> eyre::Result<()> {
    query(table, &[], write)
}

/// Prints the rows of a table matching every condition
pub fn query<W: Write>(
    table: &SharedTable,
    conditions: &[Condition],
    write: W,
) -> eyre::Result<()> {
    let start = Instant::now();
    let records = table.select_where_multi(conditions, Source::Disk)?;
    let header = header(table)?;
    write_rows(write, &header, &records, start.elapsed())
}

/// Writes the rows of a table as json
pub fn export<W: Write>(table: &SharedTable, mut write: W) -> eyre::Result<()> {
    let json = table.export_to_json_from_disk()?;
    writeln!(write, "{json}")?;
    Ok(())
}

/// Imports a json document into a table, replacing its rows unless `append` is set
pub fn import<W: Write>(
    table: &SharedTable,
    json: &str,
    append: bool,
    write: W,
) -> eyre::Result<()> {
    let start = Instant::now();
    let count = table.import_from_json_to_disk(json, append)?;
    info!("imported {count} rows into {}", table.name());
    write_affected(write, count, start.elapsed())
}

pub fn update<W: Write>(
    table: &SharedTable,
    condition: &Condition,
    updates: &UpdateSet,
    write: W,
) -> eyre::Result<()> {
    let start = Instant::now();
    let count = table.update_where_from_disk(
        condition.column(),
        &condition.op().to_string(),
        condition.value(),
        updates,
    )?;
    write_affected(write, count, start.elapsed())
}

pub fn delete<W: Write>(table: &SharedTable, condition: &Condition, write: W) -> eyre::Result<()> {
    let start = Instant::now();
    let count = table.delete_where_from_disk(
        condition.column(),
        &condition.op().to_string(),
        condition.value(),
    )?;
    write_affected(write, count, start.elapsed())
}

/// Removes every row from a table, keeping its header
pub fn clear<W: Write>(table: &SharedTable, write: W) -> eyre::Result<()> {
    let start = Instant::now();
    let header = header(table)?;
    if header.is_empty() {
        debug!("{} has no table file, nothing to clear", table.name());
        return write_affected(write, 0, start.elapsed());
    }
    let count = table.load_from_disk()?.len();
    let names = header.iter().map(String::as_str).collect::<Vec<_>>();
    table.set_columns(&names)?;
    table.clear_disk()?;
    write_affected(write, count, start.elapsed())
}

/// The header of the table file, empty if there is no file
fn header(table: &SharedTable) -> eyre::Result<Vec<String>> {
    Ok(table.read().file().read_header()?.unwrap_or_default())
}

use minidb_core::config::TableConfig;
use minidb_core::error::{Error, ErrorKind};
use minidb_core::queries::condition::UpdateSet;
use minidb_core::tables::table::Table;
use tempfile::tempdir;
use tracing::level_filters::LevelFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .try_init();
}

fn people(dir: &std::path::Path) -> Result<Table, Error> {
    let mut table = Table::new("people", &TableConfig::in_path(dir));
    table.set_columns(&["Name", "Age"])?;
    table.insert_row(["Alice", "30"])?;
    table.insert_row(["Bob", "25"])?;
    table.insert_row(["Charlie", "30"])?;
    Ok(table)
}

#[test]
fn ordering_operators_need_numeric_columns() -> Result<(), Error> {
    init_tracing();
    let dir = tempdir()?;
    let table = people(dir.path())?;

    let err = table.select_where_from_memory("Name", ">", "K").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Operator);

    let found = table.select_where_from_memory("Name", "==", "Bob")?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["Age"], "25");
    Ok(())
}

#[test]
fn update_matching_rows_in_memory() -> Result<(), Error> {
    init_tracing();
    let dir = tempdir()?;
    let mut table = people(dir.path())?;

    let updates = UpdateSet::from([("Name".to_string(), "Updated".to_string())]);
    assert_eq!(table.update_where_from_memory("Age", "==", "30", &updates)?, 2);

    let rows = table
        .select_all()
        .into_iter()
        .map(|record| record.into_values().collect::<Vec<_>>())
        .collect::<Vec<_>>();
    assert_eq!(
        rows,
        [["Updated", "30"], ["Bob", "25"], ["Updated", "30"]]
    );
    Ok(())
}

#[test]
fn unknown_columns_are_not_found() -> Result<(), Error> {
    init_tracing();
    let dir = tempdir()?;
    let mut table = people(dir.path())?;
    table.save()?;

    for err in [
        table.select_where_from_memory("Email", "==", "x").unwrap_err(),
        table.select_where_from_disk("Email", "==", "x").unwrap_err(),
        table.delete_where_from_disk("Email", "==", "x").unwrap_err(),
        table.delete_where_from_memory("Email", "==", "x").unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
    assert!(!table.file().staging_path().exists());
    Ok(())
}

use std::io::Write;
use std::time::Duration;

use tabled::builder::Builder;
use tabled::grid::config::HorizontalLine;
use tabled::settings::Style;

use minidb_core::data::row::Record;

/// Writes records as an ascii table, followed by the number of rows
pub fn write_rows<W: Write, S: AsRef<str>>(
    mut write: W,
    header: &[S],
    records: &[Record],
    time: Duration,
) -> eyre::Result<()> {
    let mut builder = Builder::new();
    builder.push_record(header.iter().map(|col| col.as_ref().to_string()));
    for record in records {
        builder.push_record(header.iter().map(|col| {
            record
                .get(col.as_ref())
                .cloned()
                .unwrap_or_default()
        }));
    }
    let row_count = records.len();

    let table = builder
        .build()
        .with(Style::ascii().remove_horizontal().horizontals([(
            1,
            HorizontalLine::new(Some('-'), Some('+'), Some('+'), Some('+')).into(),
        )]))
        .to_string();

    writeln!(write, "{table}")?;
    writeln!(
        write,
        "{row_count} {} in set ({:0.2} sec)",
        pluralizer::pluralize("row", row_count as isize, false),
        time.as_secs_f64()
    )?;

    Ok(())
}

/// Writes how many rows a command changed
pub fn write_affected<W: Write>(mut write: W, count: usize, time: Duration) -> eyre::Result<()> {
    writeln!(
        write,
        "Query OK, {count} {} affected ({:0.2} sec)",
        pluralizer::pluralize("row", count as isize, false),
        time.as_secs_f64()
    )?;
    Ok(())
}

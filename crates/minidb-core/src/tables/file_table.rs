//! Table in a file
//!
//! A table file holds a header line of column names followed by one line per
//! row. Reads are lenient: rows are padded or truncated to the width of the
//! header rather than dropped.

use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::config::TableConfig;
use crate::data::row::{Record, Row, RowPolicy};
use crate::error::Error;
use crate::tables::atomic_replace::{AtomicReplace, Staged};
use crate::tables::wire::{RecordWriter, WireFormat};

pub const TABLE_FILE_EXTENSION: &str = "tbl";
pub const STAGING_FILE_SUFFIX: &str = "_temp";

/// The contents of a table file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskTable {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl DiskTable {
    /// The column names found in the header line
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Maps every row onto the header. Cells past the end of the header are
    /// dropped.
    pub fn records(&self) -> Vec<Record> {
        self.rows.iter().map(|row| row.to_record(&self.header)).collect()
    }
}

/// The on-disk representation of a table
#[derive(Debug, Clone)]
pub struct TableFile {
    path: PathBuf,
    staging: PathBuf,
    format: WireFormat,
    sync: bool,
}

impl TableFile {
    /// The file of the table `name`, as configured
    pub fn new(config: &TableConfig, name: &str) -> Self {
        Self {
            path: config
                .data_dir
                .join(format!("{name}.{TABLE_FILE_EXTENSION}")),
            staging: config
                .data_dir
                .join(format!("{name}{STAGING_FILE_SUFFIX}.{TABLE_FILE_EXTENSION}")),
            format: config.wire_format,
            sync: config.sync_before_rename,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where replacement contents are staged before being renamed over the file
    pub fn staging_path(&self) -> &Path {
        &self.staging
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the whole file. Returns `None` if there is no file.
    pub fn read(&self) -> Result<Option<DiskTable>, Error> {
        self.read_rows(true)
    }

    /// Reads the whole file without fitting rows to the header, so rows keep
    /// every cell they were written with. Returns `None` if there is no file.
    pub fn read_unfitted(&self) -> Result<Option<DiskTable>, Error> {
        self.read_rows(false)
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()), err)]
    fn read_rows(&self, fit: bool) -> Result<Option<DiskTable>, Error> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no table file found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let mut records = self.format.reader(file);
        let header = match records.next() {
            Some(header) => header?.into_cells(),
            None => return Ok(Some(DiskTable::default())),
        };
        let width = header.len();
        let mut rows = vec![];
        for row in records {
            let row = row?;
            if fit {
                rows.extend(RowPolicy::Lenient.apply(row, width));
            } else {
                rows.push(row);
            }
        }
        debug!("read {} rows", rows.len());
        Ok(Some(DiskTable { header, rows }))
    }

    /// Reads only the header line. A file holding nothing but blank lines has
    /// an empty header.
    pub fn read_header(&self) -> Result<Option<Vec<String>>, Error> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match self.format.reader(file).next() {
            Some(header) => Ok(Some(header?.into_cells())),
            None => Ok(Some(vec![])),
        }
    }

    /// Creates the replacer used for every rewrite of this file
    pub fn replacer(&self) -> AtomicReplace {
        AtomicReplace::new(&self.path, &self.staging, self.format).sync_before_rename(self.sync)
    }

    /// Atomically replaces the file with a header and rows. Every row is written
    /// with exactly as many cells as there are columns in the header.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()), err)]
    pub fn overwrite<'r, S, I>(&self, header: &[S], rows: I) -> Result<usize, Error>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = &'r Row>,
    {
        self.replacer().run(|_, writer| {
            let written = write_table(writer, header, rows)?;
            debug!("staged {written} rows");
            Ok(Staged::Commit(written))
        })
    }

    /// Appends rows directly to the end of the file, without staging. If the
    /// file has no header yet, the given header is written first.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()), err)]
    pub fn append<'r, S, I>(&self, header: &[S], rows: I) -> Result<usize, Error>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = &'r Row>,
    {
        let is_new = self.read_header()?.map_or(true, |header| header.is_empty());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = self.format.writer(file);
        let written = if is_new {
            write_table(&mut writer, header, rows)?
        } else {
            write_rows(&mut writer, header.len(), rows)?
        };
        writer.finish()?;
        debug!("appended {written} rows");
        Ok(written)
    }

    /// Removes the file, returning whether there was one
    pub fn remove(&self) -> Result<bool, Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes a header and then every row
pub(crate) fn write_table<'r, W, S, I>(
    writer: &mut RecordWriter<W>,
    header: &[S],
    rows: I,
) -> Result<usize, Error>
where
    W: io::Write,
    S: AsRef<str>,
    I: IntoIterator<Item = &'r Row>,
{
    writer.write_record(header.iter().map(AsRef::as_ref))?;
    write_rows(writer, header.len(), rows)
}

/// Writes rows, each fit to `width` cells
pub(crate) fn write_rows<'r, W, I>(
    writer: &mut RecordWriter<W>,
    width: usize,
    rows: I,
) -> Result<usize, Error>
where
    W: io::Write,
    I: IntoIterator<Item = &'r Row>,
{
    let mut written = 0;
    for row in rows {
        let present = row.len().min(width);
        writer.write_record(
            row.cells()[..present]
                .iter()
                .map(String::as_str)
                .chain(std::iter::repeat("").take(width - present)),
        )?;
        written += 1;
    }
    Ok(written)
}

//! Line oriented record encoding for table files.
//!
//! [`WireFormat::Plain`] is the compatible format: cells joined by `,` with no
//! escaping at all, so a cell holding a delimiter, quote or newline corrupts
//! the row it is in. [`WireFormat::Quoted`] quotes such cells and is otherwise
//! byte-for-byte the same as `Plain`.

use std::io;
use std::io::{BufRead, BufReader, BufWriter, Lines, Read, Write};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::data::row::Row;
use crate::error::Error;

pub const DELIMITER: char = ',';

/// The encoding used for the lines of a table file
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Plain,
    Quoted,
}

impl WireFormat {
    /// Streams records out of a reader
    pub fn reader<R: Read>(self, read: R) -> Records<R> {
        let inner = match self {
            WireFormat::Plain => RecordsInner::Plain(BufReader::new(read).lines()),
            WireFormat::Quoted => RecordsInner::Quoted(
                csv::ReaderBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(read)
                    .into_records(),
            ),
        };
        Records {
            inner,
            in_body: false,
        }
    }

    /// Creates a record writer over a writer
    pub fn writer<W: Write>(self, write: W) -> RecordWriter<W> {
        let inner = match self {
            WireFormat::Plain => WriterInner::Plain(BufWriter::new(write)),
            WireFormat::Quoted => WriterInner::Quoted(
                csv::WriterBuilder::new()
                    .has_headers(false)
                    .flexible(true)
                    .terminator(csv::Terminator::Any(b'\n'))
                    .from_writer(write),
            ),
        };
        RecordWriter { inner }
    }
}

/// Records read from a table file.
///
/// Blank lines before the header are skipped. After the header a blank line
/// is a row with a single empty cell.
pub struct Records<R: Read> {
    inner: RecordsInner<R>,
    in_body: bool,
}

enum RecordsInner<R: Read> {
    Plain(Lines<BufReader<R>>),
    Quoted(csv::StringRecordsIntoIter<R>),
}

impl<R: Read> Iterator for Records<R> {
    type Item = Result<Row, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            RecordsInner::Plain(lines) => loop {
                let line = match lines.next()? {
                    Ok(line) => line,
                    Err(e) => return Some(Err(e.into())),
                };
                let trimmed = line.strip_suffix('\r').unwrap_or(&line);
                if trimmed.is_empty() && !self.in_body {
                    continue;
                }
                self.in_body = true;
                return Some(Ok(trimmed.split(DELIMITER).collect()));
            },
            RecordsInner::Quoted(records) => records
                .next()
                .map(|record| -> Result<Row, Error> { Ok(record?.iter().collect()) }),
        }
    }
}

/// Writes records to a table file, one per line
pub struct RecordWriter<W: Write> {
    inner: WriterInner<W>,
}

enum WriterInner<W: Write> {
    Plain(BufWriter<W>),
    Quoted(csv::Writer<W>),
}

impl<W: Write> RecordWriter<W> {
    pub fn write_record<I, S>(&mut self, cells: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match &mut self.inner {
            WriterInner::Plain(write) => {
                for (i, cell) in cells.into_iter().enumerate() {
                    if i > 0 {
                        write.write_all(&[DELIMITER as u8])?;
                    }
                    write.write_all(cell.as_ref().as_bytes())?;
                }
                write.write_all(b"\n")?;
            }
            WriterInner::Quoted(write) => {
                write.write_record(cells.into_iter().map(|cell| cell.as_ref().to_string()))?;
            }
        }
        Ok(())
    }

    /// Flushes everything written so far and gives back the underlying writer
    pub fn finish(self) -> Result<W, Error> {
        match self.inner {
            WriterInner::Plain(write) => write.into_inner().map_err(|e| e.into_error().into()),
            WriterInner::Quoted(write) => write.into_inner().map_err(|e| {
                Error::IoError(io::Error::new(e.error().kind(), e.error().to_string()))
            }),
        }
    }
}

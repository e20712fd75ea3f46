use crate::data::types::ColumnType;
use crate::queries::condition::Op;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Illegal schema definition: {0}")]
    IllegalSchema(String),
    #[error("No schema has been set for this table")]
    NoSchema,
    #[error("Schema mismatch (expected columns {expected:?}, received: {actual:?})")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("Expected {expected} columns, but found {actual}")]
    BadColumnCount { expected: usize, actual: usize },
    #[error("No column named {0:?}")]
    NoColumnFound(String),
    #[error("Operator {op} can not be applied to a column of type {column_type}")]
    IllegalOperator { op: Op, column_type: ColumnType },
    #[error("Unknown operator {0:?}")]
    UnknownOperator(String),
    #[error(transparent)]
    IoError(#[from] io::Error),
    #[error(transparent)]
    CsvError(#[from] csv::Error),
    #[error("Table file {0:?} is locked by another owner")]
    TableLocked(PathBuf),
    #[error("Malformed json: {0}")]
    JsonFormat(String),
    #[error("Malformed condition: {0:?}")]
    MalformedCondition(String),
}

/// The broad category an [`Error`] falls into
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub enum ErrorKind {
    Schema,
    Cardinality,
    NotFound,
    Operator,
    Io,
    Format,
}

impl Error {
    /// Gets the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IllegalSchema(_) | Error::NoSchema | Error::SchemaMismatch { .. } => {
                ErrorKind::Schema
            }
            Error::BadColumnCount { .. } => ErrorKind::Cardinality,
            Error::NoColumnFound(_) => ErrorKind::NotFound,
            Error::IllegalOperator { .. } | Error::UnknownOperator(_) => ErrorKind::Operator,
            Error::IoError(_) | Error::CsvError(_) | Error::TableLocked(_) => ErrorKind::Io,
            Error::JsonFormat(_) | Error::MalformedCondition(_) => ErrorKind::Format,
        }
    }

    pub(crate) fn json_format(reason: impl ToString) -> Self {
        Self::JsonFormat(reason.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        if value.is_io() {
            Error::IoError(value.into())
        } else {
            Error::json_format(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{Error, ErrorKind};

    #[test]
    fn json_syntax_errors_are_format_errors() {
        let err: Error = serde_json::from_str::<serde_json::Value>("[{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}

//! Table configuration

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::tables::wire::WireFormat;

/// The configuration of a table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TableConfig {
    /// Directory holding the table files
    pub data_dir: PathBuf,
    pub wire_format: WireFormat,
    /// Fsync the staging file before it is renamed over a table file
    pub sync_before_rename: bool,
    /// Take an advisory lock on the table when it is opened as a shared table
    pub advisory_lock: bool,
}

impl TableConfig {
    /// A configuration storing tables in the given directory
    pub fn in_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            data_dir: path.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Reads a configuration from a json file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn with_wire_format(mut self, wire_format: WireFormat) -> Self {
        self.wire_format = wire_format;
        self
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            data_dir: PathBuf::from("data"),
            wire_format: WireFormat::Plain,
            sync_before_rename: false,
            advisory_lock: true,
        }
    }
}

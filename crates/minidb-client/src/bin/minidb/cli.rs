use std::path::PathBuf;

use clap::{value_parser, ArgAction, Parser, Subcommand};
use log::LevelFilter;
use minidb_core::config::TableConfig;
use minidb_core::queries::condition::{Condition, UpdateSet};
use minidb_core::tables::wire::WireFormat;

/// Runs a single command against a minidb table
#[derive(Debug, Parser)]
pub struct App {
    /// The directory holding the table files
    #[clap(long)]
    pub data_dir: Option<PathBuf>,

    /// A json file to read the table configuration from
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Quote cells containing delimiters when writing table files
    #[clap(long)]
    pub quoted: bool,

    /// Also write logs to this file
    #[clap(long)]
    pub log_file: Option<PathBuf>,

    /// Sets the verbosity of the application
    #[clap(short)]
    #[clap(action = ArgAction::Count, value_parser = value_parser!(u8).range(0..=3))]
    pub verbosity: u8,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints every row of a table
    Show { table: String },
    /// Prints the rows matching every condition, such as `"age >= 30"`
    Query {
        table: String,
        conditions: Vec<Condition>,
    },
    /// Writes a table as json
    Export {
        table: String,
        /// Write to this file instead of stdout
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Imports a json array of objects
    Import {
        table: String,
        file: PathBuf,
        /// Append to the table instead of replacing it
        #[clap(long)]
        append: bool,
    },
    /// Sets cells of the rows matching a condition
    Update {
        table: String,
        #[clap(long = "where")]
        condition: Condition,
        /// `column=value` assignments
        #[clap(long = "set", required = true, value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },
    /// Removes the rows matching a condition
    Delete {
        table: String,
        #[clap(long = "where")]
        condition: Condition,
    },
    /// Removes every row of a table, keeping its columns
    Clear { table: String },
}

impl Command {
    pub fn table(&self) -> &str {
        match self {
            Command::Show { table }
            | Command::Query { table, .. }
            | Command::Export { table, .. }
            | Command::Import { table, .. }
            | Command::Update { table, .. }
            | Command::Delete { table, .. }
            | Command::Clear { table } => table,
        }
    }
}

impl App {
    pub fn level_filter(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            3.. => LevelFilter::Trace,
        }
    }

    /// The table configuration, from the config file if given, then overridden by flags
    pub fn table_config(&self) -> eyre::Result<TableConfig> {
        let mut config = match &self.config {
            Some(path) => TableConfig::from_json_file(path)?,
            None => TableConfig::default(),
        };
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if self.quoted {
            config.wire_format = WireFormat::Quoted;
        }
        Ok(config)
    }
}

/// Collects `--set` assignments into an update set. Later assignments to the
/// same column win.
pub fn update_set(assignments: &[(String, String)]) -> UpdateSet {
    assignments.iter().cloned().collect()
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected column=value, found {s:?}")),
    }
}

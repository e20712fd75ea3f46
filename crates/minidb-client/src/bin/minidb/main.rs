use std::fs;
use std::fs::File;
use std::io::stdout;

use clap::Parser;
use log::{error, info};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

use minidb_client::commands;
use minidb_core::tables::SharedTable;

use crate::cli::{update_set, App, Command};

mod cli;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let app = App::parse();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        app.level_filter(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(log_file) = &app.log_file {
        let log_file = File::options().append(true).create(true).open(log_file)?;
        loggers.push(WriteLogger::new(app.level_filter(), Config::default(), log_file));
    }
    CombinedLogger::init(loggers)?;

    let config = app.table_config()?;
    info!("using tables in {:?}", config.data_dir);
    let table = match SharedTable::open(app.command.table(), &config) {
        Ok(table) => table,
        Err(e) => {
            error!("Failed to open table {:?} ({e})", app.command.table());
            return Err(e.into());
        }
    };

    match &app.command {
        Command::Show { .. } => commands::show(&table, stdout())?,
        Command::Query { conditions, .. } => commands::query(&table, conditions, stdout())?,
        Command::Export { out: Some(path), .. } => commands::export(&table, File::create(path)?)?,
        Command::Export { out: None, .. } => commands::export(&table, stdout())?,
        Command::Import { file, append, .. } => {
            let json = fs::read_to_string(file)?;
            commands::import(&table, &json, *append, stdout())?
        }
        Command::Update {
            condition,
            assignments,
            ..
        } => commands::update(&table, condition, &update_set(assignments), stdout())?,
        Command::Delete { condition, .. } => commands::delete(&table, condition, stdout())?,
        Command::Clear { .. } => commands::clear(&table, stdout())?,
    }

    Ok(())
}

//! # minidb-core
//!
//! An embedded flat-file table engine. Each table keeps its rows in memory and
//! can persist them to a single line oriented file, which is only ever
//! rewritten through a staging file and an atomic rename.

pub mod config;
pub mod data;
pub mod dynamic_table;
pub mod error;
pub mod interchange;
pub mod logs;
pub mod queries;
pub mod tables;

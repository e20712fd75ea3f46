//! A client for minidb tables, running one command per invocation

pub mod commands;
pub mod write_rows;

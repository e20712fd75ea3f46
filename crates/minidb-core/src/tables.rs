//! Tables, in memory and on disk
pub mod atomic_replace;
pub mod file_table;
pub mod shared_table;
pub mod table;
pub mod table_schema;
pub mod wire;

pub use shared_table::SharedTable;
pub use table::{Source, Table};

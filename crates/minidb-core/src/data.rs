//! The data that is actually stored

pub mod numeric;
pub mod row;
pub mod types;

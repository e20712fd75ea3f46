//! Filtering rows by conditions

pub mod comparator;
pub mod condition;

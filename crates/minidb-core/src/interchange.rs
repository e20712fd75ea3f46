//! Moving table contents in and out of other formats

pub mod json;

//! A row of data

use std::fmt;
use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut, Index, IndexMut};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A row read back out of a table, mapping column names to cells in column order
pub type Record = IndexMap<String, String>;

/// A row of data. Cells are aligned by position with the columns of a schema.
#[derive(Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

impl Row {
    /// Gets the number of cells in this row
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the cells of this row
    pub fn cells(&self) -> &[String] {
        &self.0
    }

    /// Converts this row into its cells
    pub fn into_cells(self) -> Vec<String> {
        self.0
    }

    /// Pads this row with empty cells, or truncates it, so that it has exactly `width` cells
    pub fn fit_to(mut self, width: usize) -> Self {
        self.0.resize(width, String::new());
        self
    }

    /// Maps the cells of this row to the given column names
    pub fn to_record<S: AsRef<str>>(&self, columns: &[S]) -> Record {
        columns
            .iter()
            .map(|col| col.as_ref().to_string())
            .zip(self.0.iter().cloned())
            .collect()
    }
}

impl Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl Deref for Row {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Row {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Index<usize> for Row {
    type Output = String;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Row {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl From<Vec<String>> for Row {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<&[&str]> for Row {
    fn from(value: &[&str]) -> Self {
        Self::from_iter(value.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Row {
    fn from(value: [&str; N]) -> Self {
        Self::from_iter(value)
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// How rows whose width does not match the expected width are treated on read.
///
/// Memory reads are strict and skip such rows, disk reads are lenient and
/// normalize them.
#[derive(Debug, Default, Eq, PartialEq, Copy, Clone)]
pub enum RowPolicy {
    #[default]
    Strict,
    Lenient,
}

impl RowPolicy {
    /// Applies this policy to a row, returning `None` if the row should be skipped
    pub fn apply(&self, row: Row, width: usize) -> Option<Row> {
        match self {
            RowPolicy::Strict if row.len() != width => None,
            RowPolicy::Strict => Some(row),
            RowPolicy::Lenient => Some(row.fit_to(width)),
        }
    }

    /// Applies this policy to a borrowed row
    pub fn accepts(&self, row: &Row, width: usize) -> bool {
        match self {
            RowPolicy::Strict => row.len() == width,
            RowPolicy::Lenient => true,
        }
    }
}

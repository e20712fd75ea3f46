//! Type-aware evaluation of conditions against rows.
//!
//! Operator legality is checked once when a [`Filter`] is built. Rows whose
//! compared cell can not be read as the column's type simply don't match.

use tracing::trace;

use crate::data::numeric::{parse_float, parse_int};
use crate::data::row::Row;
use crate::data::types::ColumnType;
use crate::error::Error;
use crate::queries::condition::{Condition, Op};

/// Compares two cells as values of the given type
pub fn compare_cells(column_type: ColumnType, lhs: &str, op: Op, rhs: &str) -> bool {
    match column_type {
        ColumnType::String => match op {
            Op::Eq => lhs == rhs,
            Op::Neq => lhs != rhs,
            _ => false,
        },
        ColumnType::Int => match (parse_int(lhs), parse_int(rhs)) {
            (Some(l), Some(r)) => op.evaluate(&l, &r),
            _ => false,
        },
        ColumnType::Float => match (parse_float(lhs), parse_float(rhs)) {
            (Some(l), Some(r)) => op.evaluate(&l, &r),
            _ => false,
        },
    }
}

/// A single condition bound to a column position and type
#[derive(Debug, Clone)]
pub struct Comparator {
    index: usize,
    column_type: ColumnType,
    op: Op,
    value: String,
}

impl Comparator {
    /// Binds a condition to a column, failing if the operator is not legal for the column's type
    pub fn new(
        condition: &Condition,
        index: usize,
        column_type: ColumnType,
    ) -> Result<Self, Error> {
        if !column_type.allows(condition.op()) {
            return Err(Error::IllegalOperator {
                op: condition.op(),
                column_type,
            });
        }
        Ok(Self {
            index,
            column_type,
            op: condition.op(),
            value: condition.value().to_string(),
        })
    }

    /// Checks whether a row matches. Rows missing the compared cell never match.
    pub fn matches(&self, row: &Row) -> bool {
        match row.get(self.index) {
            Some(cell) => compare_cells(self.column_type, cell, self.op, &self.value),
            None => {
                trace!("row {row:?} has no cell at {}", self.index);
                false
            }
        }
    }
}

/// A conjunction of comparators
#[derive(Debug, Clone, Default)]
pub struct Filter {
    comparators: Vec<Comparator>,
}

impl Filter {
    /// Builds a filter. `resolve` maps a condition to the position and type of
    /// the column it refers to.
    pub fn new<F>(conditions: &[Condition], mut resolve: F) -> Result<Self, Error>
    where
        F: FnMut(&Condition) -> Result<(usize, ColumnType), Error>,
    {
        let comparators = conditions
            .iter()
            .map(|condition| {
                let (index, column_type) = resolve(condition)?;
                Comparator::new(condition, index, column_type)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { comparators })
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.comparators.iter().all(|c| c.matches(row))
    }
}

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::data::numeric::{is_floating_point, is_signed_integer};
use crate::queries::condition::Op;

/// The type of a column. Cells are always stored as strings, the type only
/// decides how a cell is compared.
#[derive(
    Debug, Default, Deserialize, Serialize, Eq, PartialEq, Copy, Clone, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ColumnType {
    #[default]
    String,
    Int,
    Float,
}

impl ColumnType {
    /// Checks whether the given operator can be applied to cells of this type
    pub fn allows(&self, op: Op) -> bool {
        match self {
            ColumnType::String => matches!(op, Op::Eq | Op::Neq),
            ColumnType::Int | ColumnType::Float => true,
        }
    }

    /// Infers the type a literal most likely belongs to
    pub fn infer(literal: &str) -> Self {
        if is_signed_integer(literal) {
            ColumnType::Int
        } else if is_floating_point(literal) {
            ColumnType::Float
        } else {
            ColumnType::String
        }
    }
}

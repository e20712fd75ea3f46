//! Conditions are the unit of filtering used by select, update and delete.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;
use nom::bytes::complete::take_while1;
use nom::character::complete::multispace0;
use nom::combinator::rest;
use nom::sequence::{preceded, tuple};
use nom::IResult;
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};

use crate::error::Error;

/// Replacement values for an update, keyed by column name
pub type UpdateSet = IndexMap<String, String>;

/// A comparison operator
#[derive(
    Debug, Eq, PartialEq, Copy, Clone, Hash, StrumDisplay, EnumString, Serialize, Deserialize,
)]
pub enum Op {
    #[strum(serialize = "==")]
    #[serde(rename = "==")]
    Eq,
    #[strum(serialize = "!=")]
    #[serde(rename = "!=")]
    Neq,
    #[strum(serialize = ">")]
    #[serde(rename = ">")]
    Greater,
    #[strum(serialize = ">=")]
    #[serde(rename = ">=")]
    GreaterEq,
    #[strum(serialize = "<")]
    #[serde(rename = "<")]
    Less,
    #[strum(serialize = "<=")]
    #[serde(rename = "<=")]
    LessEq,
}

impl Op {
    /// Parses an operator, failing with [`Error::UnknownOperator`] if it isn't recognized
    pub fn parse(op: &str) -> Result<Self, Error> {
        Op::from_str(op).map_err(|_| Error::UnknownOperator(op.to_string()))
    }

    /// Applies this operator. Incomparable values never match.
    pub fn evaluate<T: PartialOrd + ?Sized>(&self, l: &T, r: &T) -> bool {
        match self {
            Op::Eq => l == r,
            Op::Neq => l != r,
            Op::Greater => l > r,
            Op::GreaterEq => l >= r,
            Op::Less => l < r,
            Op::LessEq => l <= r,
        }
    }
}

/// `column OP value`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    column: String,
    op: Op,
    value: String,
}

impl Condition {
    /// Creates a new condition from an operator in its textual form
    pub fn new(
        column: impl AsRef<str>,
        op: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, Error> {
        Ok(Self::with_op(column, Op::parse(op.as_ref())?, value))
    }

    pub fn with_op(column: impl AsRef<str>, op: Op, value: impl AsRef<str>) -> Self {
        Self {
            column: column.as_ref().to_string(),
            op,
            value: value.as_ref().to_string(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value)
    }
}

fn is_op_char(c: char) -> bool {
    matches!(c, '=' | '!' | '<' | '>')
}

fn condition_parts(input: &str) -> IResult<&str, (&str, &str, &str)> {
    tuple((
        preceded(
            multispace0,
            take_while1(|c: char| !c.is_whitespace() && !is_op_char(c)),
        ),
        preceded(multispace0, take_while1(is_op_char)),
        preceded(multispace0, rest),
    ))(input)
}

impl FromStr for Condition {
    type Err = Error;

    /// Parses `age >= 30`, `sensor_id==TEMP-001` and the like. Everything after
    /// the operator is the value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_, (column, op, value)) =
            condition_parts(s).map_err(|_| Error::MalformedCondition(s.to_string()))?;
        Condition::new(column, op, value.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::queries::condition::{Condition, Op};

    #[test]
    fn parse_op() {
        assert_eq!(Op::parse(">=").unwrap(), Op::GreaterEq);
        assert_eq!(Op::Neq.to_string(), "!=");
        assert_eq!(Op::parse("=~").unwrap_err().kind(), ErrorKind::Operator);
    }

    #[test]
    fn parse_condition() {
        let condition: Condition = "age >= 30".parse().unwrap();
        assert_eq!(condition, Condition::with_op("age", Op::GreaterEq, "30"));

        let condition: Condition = "sensor_id==TEMP-001".parse().unwrap();
        assert_eq!(condition.column(), "sensor_id");
        assert_eq!(condition.value(), "TEMP-001");

        let condition: Condition = "city != New York ".parse().unwrap();
        assert_eq!(condition.value(), "New York");
    }

    #[test]
    fn parse_bad_condition() {
        assert_eq!(
            "age".parse::<Condition>().unwrap_err().kind(),
            ErrorKind::Format
        );
        assert_eq!(
            "age = 30".parse::<Condition>().unwrap_err().kind(),
            ErrorKind::Operator
        );
    }
}

//! Json interchange.
//!
//! Tables are exchanged as a json array of flat objects, one object per row,
//! keyed by column name. Every cell is exported as a json string. Only the set
//! of keys matters on import, not their order.

use indexmap::IndexMap;
use serde_json::Value;

use crate::data::row::{Record, Row};
use crate::error::Error;

/// A single flat object of a json document
pub type JsonObject = IndexMap<String, String>;

/// Serializes records as a pretty printed json array
pub fn to_json(records: &[Record]) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parses a json document into its objects.
///
/// Fails if the text is not json, is not an array, is an empty array, or holds
/// anything other than flat objects. Strings are kept as is, numbers and
/// booleans become their json text and `null` becomes an empty cell.
pub fn parse_objects(text: &str) -> Result<Vec<JsonObject>, Error> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(elements) = value else {
        return Err(Error::json_format("expected a json array"));
    };
    if elements.is_empty() {
        return Err(Error::json_format("json array is empty"));
    }
    elements
        .into_iter()
        .enumerate()
        .map(|(i, element)| match element {
            Value::Object(fields) => fields
                .into_iter()
                .map(|(key, value)| match scalar_text(value) {
                    Some(cell) => Ok((key, cell)),
                    None => Err(Error::json_format(format!(
                        "field {key:?} of element {i} is not a scalar"
                    ))),
                })
                .collect(),
            _ => Err(Error::json_format(format!("element {i} is not an object"))),
        })
        .collect()
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Gets the keys of an object, in document order
pub fn keys(object: &JsonObject) -> Vec<String> {
    object.keys().cloned().collect()
}

/// Lays an object out along a header. Missing keys become empty cells and keys
/// outside of the header are ignored.
pub fn project<S: AsRef<str>>(object: &JsonObject, header: &[S]) -> Row {
    header
        .iter()
        .map(|col| object.get(col.as_ref()).cloned().unwrap_or_default())
        .collect()
}

//! A schema describes a table

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::types::ColumnType;
use crate::error::Error;

/// Table schema. An ordered list of columns, each with a name and a type.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    /// Creates a schema where every column is a string column
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, Error> {
        Self::from_columns(
            names
                .iter()
                .map(|name| ColumnDefinition::new(name, ColumnType::String))
                .collect(),
        )
    }

    /// Creates a schema from parallel lists of names and types
    pub fn typed<S: AsRef<str>>(names: &[S], types: &[ColumnType]) -> Result<Self, Error> {
        if types.is_empty() {
            return Err(Error::IllegalSchema("no column types given".to_string()));
        }
        if names.len() != types.len() {
            return Err(Error::IllegalSchema(format!(
                "{} column names given but {} column types",
                names.len(),
                types.len()
            )));
        }
        Self::from_columns(
            names
                .iter()
                .zip(types)
                .map(|(name, data_type)| ColumnDefinition::new(name, *data_type))
                .collect(),
        )
    }

    pub fn builder() -> TableSchemaBuilder {
        TableSchemaBuilder::default()
    }

    /// Creates a schema from a fixed list of columns, which must already be
    /// unique and non-empty
    pub(crate) fn from_static(columns: &[(&str, ColumnType)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(name, data_type)| ColumnDefinition::new(name, *data_type))
                .collect(),
        }
    }

    fn from_columns(columns: Vec<ColumnDefinition>) -> Result<Self, Error> {
        if columns.is_empty() {
            return Err(Error::IllegalSchema("no columns given".to_string()));
        }
        let mut seen = HashSet::new();
        for col in &columns {
            if col.name.is_empty() {
                return Err(Error::IllegalSchema("column names can not be empty".to_string()));
            }
            if !seen.insert(col.name.as_str()) {
                return Err(Error::IllegalSchema(format!(
                    "column {:?} defined more than once",
                    col.name
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Gets the column names, in order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|col| col.name()).collect()
    }

    /// Gets the column types, in order
    pub fn types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|col| col.data_type()).collect()
    }

    /// The number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn col_idx(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.col_idx(name).is_some()
    }

    /// Gets the type of a column
    pub fn column_type(&self, name: &str) -> Result<ColumnType, Error> {
        self.columns
            .iter()
            .find(|col| col.name == name)
            .map(|col| col.data_type)
            .ok_or_else(|| Error::NoColumnFound(name.to_string()))
    }

    /// Checks whether the given names are exactly this schema's column names, in any order
    pub fn matches_names<S: AsRef<str>>(&self, names: &[S]) -> bool {
        same_key_set(&self.names(), names)
    }
}

/// Checks that both lists hold the same set of names, ignoring order
pub(crate) fn same_key_set<A: AsRef<str>, B: AsRef<str>>(left: &[A], right: &[B]) -> bool {
    let left = left.iter().map(AsRef::as_ref).collect::<HashSet<_>>();
    let right = right.iter().map(AsRef::as_ref).collect::<HashSet<_>>();
    left == right
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    name: String,
    data_type: ColumnType,
}

impl ColumnDefinition {
    pub fn new(name: impl AsRef<str>, data_type: ColumnType) -> Self {
        Self {
            name: name.as_ref().to_string(),
            data_type,
        }
    }

    /// Gets the name of the column
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> ColumnType {
        self.data_type
    }
}

#[derive(Debug, Default)]
pub struct TableSchemaBuilder {
    columns: Vec<ColumnDefinition>,
}

impl TableSchemaBuilder {
    pub fn column(mut self, name: impl AsRef<str>, data_type: ColumnType) -> Self {
        self.columns.push(ColumnDefinition::new(name, data_type));
        self
    }

    pub fn build(self) -> Result<TableSchema, Error> {
        TableSchema::from_columns(self.columns)
    }
}

#[cfg(test)]
mod tests {
    use crate::data::types::ColumnType;
    use crate::error::ErrorKind;
    use crate::tables::table_schema::TableSchema;

    #[test]
    fn default_types_are_strings() {
        let schema = TableSchema::new(&["Name", "Age"]).unwrap();
        assert_eq!(schema.types(), [ColumnType::String, ColumnType::String]);
        assert_eq!(schema.names(), ["Name", "Age"]);
    }

    #[test]
    fn rejects_bad_definitions() {
        let empty: [&str; 0] = [];
        assert_eq!(TableSchema::new(&empty).unwrap_err().kind(), ErrorKind::Schema);
        assert_eq!(
            TableSchema::typed(&["a", "b"], &[ColumnType::Int]).unwrap_err().kind(),
            ErrorKind::Schema
        );
        assert_eq!(TableSchema::typed(&["a"], &[]).unwrap_err().kind(), ErrorKind::Schema);
        assert_eq!(TableSchema::new(&["a", "a"]).unwrap_err().kind(), ErrorKind::Schema);
        assert_eq!(TableSchema::new(&["a", ""]).unwrap_err().kind(), ErrorKind::Schema);
    }

    #[test]
    fn column_type_lookup() {
        let schema = TableSchema::builder()
            .column("id", ColumnType::Int)
            .column("temp", ColumnType::Float)
            .build()
            .unwrap();
        assert_eq!(schema.column_type("temp").unwrap(), ColumnType::Float);
        assert_eq!(
            schema.column_type("missing").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn name_sets_ignore_order() {
        let schema = TableSchema::new(&["Name", "Age"]).unwrap();
        assert!(schema.matches_names(&["Age", "Name"]));
        assert!(!schema.matches_names(&["Age", "Name", "City"]));
    }
}

//! Decoded rows.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::constant::TypeCode;
use crate::error::{Error, Result};
use crate::protocol::field_type::FieldType;
use crate::protocol::metadata::MetaData;
use crate::value::{FromValue, Value};

/// A column selector: a position or a case-insensitive column name
pub trait ColumnKey {
    fn position(&self, metadata: &MetaData) -> Option<usize>;
    fn describe(&self) -> String;
}

impl ColumnKey for usize {
    fn position(&self, metadata: &MetaData) -> Option<usize> {
        (*self < metadata.column_count()).then_some(*self)
    }

    fn describe(&self) -> String {
        format!("#{}", self)
    }
}

impl ColumnKey for &str {
    fn position(&self, metadata: &MetaData) -> Option<usize> {
        metadata.position(self)
    }

    fn describe(&self) -> String {
        (*self).to_owned()
    }
}

impl ColumnKey for String {
    fn position(&self, metadata: &MetaData) -> Option<usize> {
        metadata.position(self)
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

/// One row of a result set
#[derive(Debug, Clone)]
pub struct Record {
    metadata: Arc<MetaData>,
    values: Vec<Value>,
}

impl Record {
    pub(crate) fn new(metadata: Arc<MetaData>, values: Vec<Value>) -> Self {
        Self { metadata, values }
    }

    pub fn metadata(&self) -> &Arc<MetaData> {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn locate<K: ColumnKey>(&self, key: &K) -> Result<usize> {
        key.position(&self.metadata)
            .ok_or_else(|| Error::UnknownColumn(key.describe()))
    }

    pub fn get_value<K: ColumnKey>(&self, key: K) -> Result<&Value> {
        let idx = self.locate(&key)?;
        self.values
            .get(idx)
            .ok_or_else(|| Error::UnknownColumn(key.describe()))
    }

    /// Convert one column into `T`
    pub fn get<T: FromValue, K: ColumnKey>(&self, key: K) -> Result<T> {
        T::from_value(self.get_value(key)?)
    }

    pub fn field<K: ColumnKey>(&self, key: K) -> Result<Field<'_>> {
        let idx = self.locate(&key)?;
        match (self.metadata.column(idx), self.values.get(idx)) {
            (Some(column), Some(value)) => Ok(Field { column, value }),
            _ => Err(Error::UnknownColumn(key.describe())),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = Field<'_>> {
        self.metadata
            .columns()
            .iter()
            .zip(&self.values)
            .map(|(column, value)| Field { column, value })
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Column names in position order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metadata.field_names()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.values.clone()
    }

    /// Column name to value; a later column wins over an earlier one of the
    /// same name
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.metadata
            .field_names()
            .map(str::to_owned)
            .zip(self.values.iter().cloned())
            .collect()
    }

    pub fn values_at<K: ColumnKey>(&self, keys: &[K]) -> Result<Vec<Value>> {
        keys.iter()
            .map(|key| {
                let idx = self.locate(key)?;
                self.values
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| Error::UnknownColumn(key.describe()))
            })
            .collect()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, field) in self.fields().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "({} {})", field.name(), field.value())?;
        }
        Ok(())
    }
}

/// A value together with the description of its column
#[derive(Debug, Clone, Copy)]
pub struct Field<'r> {
    column: &'r FieldType,
    value: &'r Value,
}

impl<'r> Field<'r> {
    pub fn value(&self) -> &'r Value {
        self.value
    }

    pub fn name(&self) -> &'r str {
        &self.column.name
    }

    pub fn format(&self) -> &'r str {
        &self.column.format
    }

    pub fn title(&self) -> &'r str {
        &self.column.title
    }

    pub fn type_name(&self) -> &'static str {
        self.column.type_name()
    }

    pub fn type_code(&self) -> TypeCode {
        self.column.type_code
    }

    pub fn column(&self) -> &'r FieldType {
        self.column
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

/// Build a value from a decoded record, matching struct fields to columns
/// by name. Implemented by `#[derive(FromRecord)]`.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self>;
}

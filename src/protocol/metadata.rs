use std::collections::HashMap;
use std::sync::Arc;

use crate::charset::StringExtractor;
use crate::error::{Error, Result};
use crate::protocol::field_type::FieldType;
use crate::protocol::indicator::NullIndicator;
use crate::protocol::primitive::*;
use crate::record::Record;
use crate::value::Value;

/// Column descriptions of one result set
///
/// Records decoded from it share it through an `Arc`.
#[derive(Debug)]
pub struct MetaData {
    columns: Vec<FieldType>,
    /// lowercased column name -> position
    index: HashMap<String, usize>,
    extractor: Arc<dyn StringExtractor>,
}

impl MetaData {
    pub fn new(columns: Vec<FieldType>, extractor: Arc<dyn StringExtractor>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| (column.name.to_lowercase(), idx))
            .collect();
        Self {
            columns,
            index,
            extractor,
        }
    }

    /// Parse a PrepInfo parcel.
    ///
    /// Layout: estimated cost (f64), summary count (u16), then optionally the
    /// column count (u16) followed by each column's type, length, name,
    /// format and title. A payload that ends after the summary describes a
    /// statement without columns.
    #[tracing::instrument(skip_all)]
    pub fn parse_prep_info(payload: &[u8], extractor: Arc<dyn StringExtractor>) -> Result<Self> {
        let (_cost, rest) = read_double(payload)?;
        let (_summary_count, rest) = read_int_2(rest)?;
        if rest.is_empty() {
            return Ok(Self::new(Vec::new(), extractor));
        }
        let (count, mut rest) = read_int_2(rest)?;
        let mut columns = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (code, r) = read_int_2(rest)?;
            let (length, r) = read_int_2(r)?;
            let (name, r) = read_string_var(r)?;
            let (format, r) = read_string_var(r)?;
            let (title, r) = read_string_var(r)?;
            rest = r;
            columns.push(FieldType::new(
                code,
                length,
                extractor.extract(name)?,
                extractor.extract(format)?,
                extractor.extract(title)?,
            )?);
        }
        Ok(Self::new(columns, extractor))
    }

    /// Parse a DataInfo parcel: a column count followed by `(type, length)`
    /// pairs. Columns parsed this way have no names.
    #[tracing::instrument(skip_all)]
    pub fn parse_data_info(payload: &[u8], extractor: Arc<dyn StringExtractor>) -> Result<Self> {
        let (count, mut rest) = read_int_2(payload)?;
        if rest.len() != count as usize * 4 {
            return Err(Error::FormatError(format!(
                "could not get correct size of metadata (expected={}, really={})",
                count as usize * 2,
                rest.len() / 2
            )));
        }
        let mut columns = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (code, r) = read_int_2(rest)?;
            let (length, r) = read_int_2(r)?;
            rest = r;
            columns.push(FieldType::new(
                code,
                length,
                String::new(),
                String::new(),
                String::new(),
            )?);
        }
        Ok(Self::new(columns, extractor))
    }

    /// Decode an indicator-mode Record parcel.
    ///
    /// Every column advances the cursor by its own width; columns whose
    /// indicator bit is set become `Value::Null` without being interpreted.
    pub fn decode_record(self: &Arc<Self>, payload: &[u8]) -> Result<Record> {
        let (indicator, mut rest) = NullIndicator::read(payload, self.columns.len())?;
        let mut values = Vec::with_capacity(self.columns.len());
        for (idx, column) in self.columns.iter().enumerate() {
            let (raw, r) = column.read_raw(rest)?;
            rest = r;
            if indicator.is_null(idx) {
                values.push(Value::Null);
            } else {
                values.push(column.interpret(raw, self.extractor.as_ref())?);
            }
        }
        if !rest.is_empty() {
            tracing::debug!(trailing = rest.len(), "record parcel has trailing bytes");
        }
        Ok(Record::new(Arc::clone(self), values))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, idx: usize) -> Option<&FieldType> {
        self.columns.get(idx)
    }

    pub fn columns(&self) -> &[FieldType] {
        &self.columns
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Case-insensitive column lookup
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    pub fn extractor(&self) -> &Arc<dyn StringExtractor> {
        &self.extractor
    }
}

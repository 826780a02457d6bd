//! Parcel encoders.
//!
//! Used to feed scripted or simulated CLI sessions with the same bytes a
//! database would return.

use crate::constant::Flavor;
use crate::error::{Error, Result};
use crate::protocol::field_type::{FieldKind, FieldType, decimal_storage, encode_date};
use crate::protocol::indicator::write_null_indicator;
use crate::protocol::metadata::MetaData;
use crate::protocol::primitive::*;
use crate::protocol::status::{FailureStatus, SuccessStatus};
use crate::value::Value;

/// One parcel as returned by a CLI fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parcel {
    pub flavor: Flavor,
    pub payload: Vec<u8>,
}

impl Parcel {
    pub fn new(flavor: Flavor, payload: Vec<u8>) -> Self {
        Self { flavor, payload }
    }

    pub fn success(status: &SuccessStatus) -> Self {
        let mut out = Vec::new();
        write_success(&mut out, status);
        Self::new(Flavor::Success, out)
    }

    pub fn failure(status: &FailureStatus) -> Self {
        let mut out = Vec::new();
        write_failure(&mut out, status);
        Self::new(Flavor::Failure, out)
    }

    pub fn error(status: &FailureStatus) -> Self {
        let mut out = Vec::new();
        write_failure(&mut out, status);
        Self::new(Flavor::Error, out)
    }

    pub fn prep_info(columns: &[PrepInfoColumn<'_>]) -> Self {
        let mut out = Vec::new();
        write_prep_info(&mut out, columns);
        Self::new(Flavor::PrepInfo, out)
    }

    pub fn data_info(columns: &[(u16, u16)]) -> Self {
        let mut out = Vec::new();
        write_data_info(&mut out, columns);
        Self::new(Flavor::DataInfo, out)
    }

    pub fn record(payload: Vec<u8>) -> Self {
        Self::new(Flavor::Record, payload)
    }

    pub fn end_statement() -> Self {
        Self::new(Flavor::EndStatement, Vec::new())
    }

    pub fn end_request() -> Self {
        Self::new(Flavor::EndRequest, Vec::new())
    }
}

pub fn write_success(out: &mut Vec<u8>, status: &SuccessStatus) {
    write_int_2(out, status.statement_no);
    write_int_4(out, status.activity_count);
    write_int_2(out, status.warning_code);
    write_int_2(out, status.field_count);
    write_int_2(out, status.activity_type);
    write_bytes_var(out, status.warning.as_bytes());
}

pub fn write_failure(out: &mut Vec<u8>, status: &FailureStatus) {
    write_int_2(out, status.statement_no);
    write_int_2(out, status.info);
    write_int_2(out, status.error_code);
    write_bytes_var(out, status.message.as_bytes());
}

/// Column entry of a PrepInfo parcel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepInfoColumn<'a> {
    pub type_code: u16,
    pub length: u16,
    pub name: &'a str,
    pub format: &'a str,
    pub title: &'a str,
}

impl<'a> PrepInfoColumn<'a> {
    /// Column whose title is its name and with no format
    pub fn named(name: &'a str, type_code: u16, length: u16) -> Self {
        Self {
            type_code,
            length,
            name,
            format: "",
            title: name,
        }
    }
}

/// A PrepInfo parcel with a zero cost estimate and no summary
pub fn write_prep_info(out: &mut Vec<u8>, columns: &[PrepInfoColumn<'_>]) {
    write_double(out, 0.0);
    write_int_2(out, 0);
    write_int_2(out, columns.len() as u16);
    for column in columns {
        write_int_2(out, column.type_code);
        write_int_2(out, column.length);
        write_bytes_var(out, column.name.as_bytes());
        write_bytes_var(out, column.format.as_bytes());
        write_bytes_var(out, column.title.as_bytes());
    }
}

pub fn write_data_info(out: &mut Vec<u8>, columns: &[(u16, u16)]) {
    write_int_2(out, columns.len() as u16);
    for &(type_code, length) in columns {
        write_int_2(out, type_code);
        write_int_2(out, length);
    }
}

/// Builds indicator-mode Record payloads for a known column layout.
///
/// Text is written as UTF-8. CHAR and BYTE values are padded to the declared
/// length with spaces and zero bytes respectively.
pub struct RecordWriter<'m> {
    metadata: &'m MetaData,
}

impl<'m> RecordWriter<'m> {
    pub fn new(metadata: &'m MetaData) -> Self {
        Self { metadata }
    }

    pub fn write(&self, values: &[Value]) -> Result<Vec<u8>> {
        let columns = self.metadata.columns();
        if values.len() != columns.len() {
            return Err(Error::BadUsageError(format!(
                "record has {} values for {} columns",
                values.len(),
                columns.len()
            )));
        }
        let nulls: Vec<bool> = values.iter().map(Value::is_null).collect();
        let mut out = Vec::new();
        write_null_indicator(&mut out, &nulls);
        for (column, value) in columns.iter().zip(values) {
            write_value(&mut out, column, value)?;
        }
        Ok(out)
    }
}

fn mismatch(column: &FieldType, value: &Value) -> Error {
    Error::BadUsageError(format!(
        "cannot write {:?} into a {} column",
        value,
        column.type_name()
    ))
}

/// Append one column; `Value::Null` writes a zero-filled placeholder
pub fn write_value(out: &mut Vec<u8>, column: &FieldType, value: &Value) -> Result<()> {
    if value.is_null() {
        match column.fixed_width() {
            Some(width) => out.resize(out.len() + width, 0),
            None => write_int_2(out, 0),
        }
        return Ok(());
    }
    let length = column.length as usize;
    match column.kind() {
        FieldKind::FixChar | FieldKind::FixByte => {
            let (bytes, pad) = match value {
                Value::Text(s) if column.kind() == FieldKind::FixChar => (s.as_bytes(), b' '),
                Value::Bytes(b) if column.kind() == FieldKind::FixByte => (b.as_slice(), 0),
                _ => return Err(mismatch(column, value)),
            };
            if bytes.len() > length {
                return Err(Error::BadUsageError(format!(
                    "value of {} bytes does not fit in {} bytes",
                    bytes.len(),
                    length
                )));
            }
            write_bytes_fix(out, bytes);
            out.resize(out.len() + (length - bytes.len()), pad);
        }
        FieldKind::VarChar | FieldKind::VarByte => {
            let bytes = match value {
                Value::Text(s) if column.kind() == FieldKind::VarChar => s.as_bytes(),
                Value::Bytes(b) if column.kind() == FieldKind::VarByte => b.as_slice(),
                _ => return Err(mismatch(column, value)),
            };
            write_bytes_var(out, bytes);
        }
        FieldKind::ByteInt => {
            let v = i8::try_from(value.as_i64().ok_or_else(|| mismatch(column, value))?)
                .map_err(|_| mismatch(column, value))?;
            write_int_1(out, v as u8);
        }
        FieldKind::SmallInt => {
            let v = i16::try_from(value.as_i64().ok_or_else(|| mismatch(column, value))?)
                .map_err(|_| mismatch(column, value))?;
            write_int_2(out, v as u16);
        }
        FieldKind::Integer => {
            let v = i32::try_from(value.as_i64().ok_or_else(|| mismatch(column, value))?)
                .map_err(|_| mismatch(column, value))?;
            write_int_4(out, v as u32);
        }
        FieldKind::BigInt => {
            let v = value.as_i64().ok_or_else(|| mismatch(column, value))?;
            write_int_8(out, v as u64);
        }
        FieldKind::Float => {
            let v = value.as_f64().ok_or_else(|| mismatch(column, value))?;
            write_double(out, v);
        }
        FieldKind::Decimal { width, fractional } => {
            let Value::Decimal(text) = value else {
                return Err(mismatch(column, value));
            };
            write_decimal(out, text, width, fractional)?;
        }
        FieldKind::Date => {
            let Value::Date(text) = value else {
                return Err(mismatch(column, value));
            };
            write_int_4(out, encode_date(text)? as u32);
        }
    }
    Ok(())
}

/// Parse `-123.45` into sign and unscaled magnitude for `fractional` digits
fn parse_decimal(text: &str, fractional: u8) -> Result<(bool, u128)> {
    let bad = || Error::BadUsageError(format!("invalid decimal: {:?}", text));
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let frac = fractional as usize;
    if frac_part.len() > frac {
        return Err(bad());
    }
    let mut digits = String::with_capacity(int_part.len() + frac);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    for _ in frac_part.len()..frac {
        digits.push('0');
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let magnitude = digits.parse::<u128>().map_err(|_| bad())?;
    Ok((negative, magnitude))
}

fn write_decimal(out: &mut Vec<u8>, text: &str, width: u8, fractional: u8) -> Result<()> {
    let (negative, magnitude) = parse_decimal(text, fractional)?;
    let out_of_range = || {
        Error::BadUsageError(format!(
            "decimal {} does not fit in DECIMAL({},{})",
            text, width, fractional
        ))
    };
    let signed = |m: u128| -> Result<i128> {
        let v = i128::try_from(m).map_err(|_| out_of_range())?;
        Ok(if negative { -v } else { v })
    };
    match decimal_storage(width) {
        1 => write_int_1(out, i8::try_from(signed(magnitude)?).map_err(|_| out_of_range())? as u8),
        2 => write_int_2(out, i16::try_from(signed(magnitude)?).map_err(|_| out_of_range())? as u16),
        4 => write_int_4(out, i32::try_from(signed(magnitude)?).map_err(|_| out_of_range())? as u32),
        8 => write_int_8(out, i64::try_from(signed(magnitude)?).map_err(|_| out_of_range())? as u64),
        _ => {
            // sign-magnitude halves: the high half carries the sign
            let lower = magnitude as u64;
            let upper = i64::try_from(magnitude >> 64).map_err(|_| out_of_range())?;
            if negative && upper == 0 {
                return Err(out_of_range());
            }
            write_int_8(out, lower);
            write_int_8(out, (if negative { -upper } else { upper }) as u64);
        }
    }
    Ok(())
}

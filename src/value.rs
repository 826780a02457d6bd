//! Decoded column values and conversion into Rust types.

use std::fmt;

use crate::error::{Error, Result};

/// One decoded column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The indicator bit for the column was set
    Null,
    /// BYTEINT
    ByteInt(i8),
    /// SMALLINT
    SmallInt(i16),
    /// INTEGER
    Integer(i32),
    /// BIGINT
    BigInt(i64),
    /// FLOAT (8-byte IEEE-754)
    Float(f64),
    /// DECIMAL rendered with its fractional point, e.g. `-123.45`
    Decimal(String),
    /// DATE rendered as `YYYY-MM-DD`
    Date(String),
    /// CHAR, VARCHAR
    Text(String),
    /// BYTE, VARBYTE
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer variants widened to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::ByteInt(v) => Some(i64::from(v)),
            Value::SmallInt(v) => Some(i64::from(v)),
            Value::Integer(v) => Some(i64::from(v)),
            Value::BigInt(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Text, decimal and date values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Decimal(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::ByteInt(_) => "BYTEINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Integer(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::Float(_) => "FLOAT",
            Value::Decimal(_) => "DECIMAL",
            Value::Date(_) => "DATE",
            Value::Text(_) => "CHAR",
            Value::Bytes(_) => "BYTE",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::ByteInt(v) => write!(f, "{}", v),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(s) | Value::Date(s) | Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => {
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
        }
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::BadUsageError(format!(
        "Cannot decode {} to {}",
        value.kind(),
        std::any::type_name::<T>()
    ))
}

/// Conversion from a decoded column value.
///
/// `NULL` only converts into `Option<T>` (and `Value`); every other target
/// rejects it.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self> {
                    let wide = value.as_i64().ok_or_else(|| mismatch::<$ty>(value))?;
                    <$ty>::try_from(wide).map_err(|_| {
                        Error::BadUsageError(format!(
                            "{} does not fit in {}",
                            wide,
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Decimal(s) => s
                .parse()
                .map_err(|_| Error::BadUsageError(format!("invalid decimal: {}", s))),
            other => other.as_i64().map(|v| v as f64).ok_or_else(|| mismatch::<f64>(other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| mismatch::<String>(value))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| mismatch::<Vec<u8>>(value))
    }
}

/// Split a `YYYY-MM-DD` date into its parts
#[cfg(any(feature = "with-chrono", feature = "with-time"))]
fn date_parts(value: &Value) -> Result<(i32, u8, u8)> {
    let Value::Date(s) = value else {
        return Err(Error::BadUsageError(format!(
            "Cannot decode {} to a date",
            value.kind()
        )));
    };
    let bad = || Error::BadUsageError(format!("invalid date: {}", s));
    let mut parts = s.splitn(3, '-');
    let year = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let month = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    let day = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
    Ok((year, month, day))
}

#[cfg(feature = "with-chrono")]
impl FromValue for chrono::NaiveDate {
    fn from_value(value: &Value) -> Result<Self> {
        let (year, month, day) = date_parts(value)?;
        chrono::NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day)).ok_or_else(
            || Error::BadUsageError(format!("invalid date: {}-{}-{}", year, month, day)),
        )
    }
}

#[cfg(feature = "with-time")]
impl FromValue for time::Date {
    fn from_value(value: &Value) -> Result<Self> {
        let (year, month, day) = date_parts(value)?;
        let month = time::Month::try_from(month)
            .map_err(|e| Error::BadUsageError(format!("invalid month: {}", e)))?;
        time::Date::from_calendar_date(year, month, day)
            .map_err(|e| Error::BadUsageError(format!("invalid date: {}", e)))
    }
}

#[cfg(feature = "with-rust-decimal")]
impl FromValue for rust_decimal::Decimal {
    fn from_value(value: &Value) -> Result<Self> {
        use std::str::FromStr;

        match value {
            Value::Decimal(s) => rust_decimal::Decimal::from_str(s)
                .map_err(|e| Error::BadUsageError(format!("invalid decimal {}: {}", s, e))),
            other => other
                .as_i64()
                .map(rust_decimal::Decimal::from)
                .ok_or_else(|| mismatch::<rust_decimal::Decimal>(other)),
        }
    }
}

use crate::charset::StringExtractor;
use crate::constant::TypeCode;
use crate::error::{Error, Result};
use crate::protocol::primitive::*;
use crate::value::Value;

/// How the bytes of a column are laid out in a Record parcel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// CHAR: exactly `length` bytes, extracted as text
    FixChar,
    /// BYTE: exactly `length` bytes, kept raw
    FixByte,
    /// VARCHAR: 2-byte length prefix, extracted as text
    VarChar,
    /// VARBYTE: 2-byte length prefix, kept raw
    VarByte,
    ByteInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    /// DECIMAL(width, fractional)
    Decimal { width: u8, fractional: u8 },
    Date,
}

impl FieldKind {
    fn from_code(code: TypeCode, length: u16) -> Self {
        match code {
            TypeCode::CHAR_NN | TypeCode::CHAR_N => Self::FixChar,
            TypeCode::BYTE_NN | TypeCode::BYTE_N => Self::FixByte,
            TypeCode::VARCHAR_NN | TypeCode::VARCHAR_N => Self::VarChar,
            TypeCode::VARBYTE_NN | TypeCode::VARBYTE_N => Self::VarByte,
            TypeCode::BYTEINT_NN | TypeCode::BYTEINT_N => Self::ByteInt,
            TypeCode::SMALLINT_NN | TypeCode::SMALLINT_N => Self::SmallInt,
            TypeCode::INTEGER_NN | TypeCode::INTEGER_N => Self::Integer,
            TypeCode::BIGINT_NN | TypeCode::BIGINT_N => Self::BigInt,
            TypeCode::FLOAT_NN | TypeCode::FLOAT_N => Self::Float,
            TypeCode::DECIMAL_NN | TypeCode::DECIMAL_N => {
                let [width, fractional] = length.to_be_bytes();
                Self::Decimal { width, fractional }
            }
            TypeCode::DATE_NN | TypeCode::DATE_N => Self::Date,
        }
    }
}

/// Storage bytes of a DECIMAL with `width` total digits
pub fn decimal_storage(width: u8) -> usize {
    match width {
        0..=2 => 1,
        3..=4 => 2,
        5..=9 => 4,
        10..=18 => 8,
        _ => 16,
    }
}

/// One column description from a PrepInfo or DataInfo parcel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub type_code: TypeCode,
    /// Declared length; for DECIMAL the high byte is the width and the low
    /// byte the number of fractional digits
    pub length: u16,
    pub name: String,
    pub format: String,
    pub title: String,
    kind: FieldKind,
}

impl FieldType {
    /// Fails with `FormatError` for a type code with no decoder
    pub fn new(
        code: u16,
        length: u16,
        name: String,
        format: String,
        title: String,
    ) -> Result<Self> {
        let type_code = TypeCode::from_u16(code)
            .ok_or_else(|| Error::FormatError(format!("unknown type code: {}", code)))?;
        Ok(Self {
            type_code,
            length,
            name,
            format,
            title,
            kind: FieldKind::from_code(type_code, length),
        })
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.type_code.name()
    }

    pub fn is_nullable(&self) -> bool {
        self.type_code.is_nullable()
    }

    /// Number of bytes this column occupies in a record, when it does not
    /// depend on the data
    pub fn fixed_width(&self) -> Option<usize> {
        match self.kind {
            FieldKind::FixChar | FieldKind::FixByte => Some(self.length as usize),
            FieldKind::VarChar | FieldKind::VarByte => None,
            FieldKind::ByteInt => Some(1),
            FieldKind::SmallInt => Some(2),
            FieldKind::Integer | FieldKind::Date => Some(4),
            FieldKind::BigInt | FieldKind::Float => Some(8),
            FieldKind::Decimal { width, .. } => Some(decimal_storage(width)),
        }
    }

    /// Split this column's bytes off the front of a record body.
    ///
    /// The returned slice excludes the length prefix of variable-length columns.
    pub fn read_raw<'a>(&self, data: &'a [u8]) -> Result<(&'a [u8], &'a [u8])> {
        match self.fixed_width() {
            Some(width) => read_string_fix(data, width),
            None => read_string_var(data),
        }
    }

    /// Interpret bytes previously split off by `read_raw`
    pub fn interpret(&self, raw: &[u8], extractor: &dyn StringExtractor) -> Result<Value> {
        let value = match self.kind {
            FieldKind::FixChar | FieldKind::VarChar => Value::Text(extractor.extract(raw)?),
            FieldKind::FixByte | FieldKind::VarByte => Value::Bytes(raw.to_vec()),
            FieldKind::ByteInt => Value::ByteInt(read_sint_1(raw)?.0),
            FieldKind::SmallInt => Value::SmallInt(read_sint_2(raw)?.0),
            FieldKind::Integer => Value::Integer(read_sint_4(raw)?.0),
            FieldKind::BigInt => Value::BigInt(read_sint_8(raw)?.0),
            FieldKind::Float => Value::Float(read_double(raw)?.0),
            FieldKind::Decimal { width, fractional } => {
                Value::Decimal(decode_decimal(raw, width, fractional)?)
            }
            FieldKind::Date => Value::Date(decode_date(raw)?),
        };
        Ok(value)
    }

    /// Decode one value and return the bytes after it
    pub fn decode<'a>(
        &self,
        data: &'a [u8],
        extractor: &dyn StringExtractor,
    ) -> Result<(Value, &'a [u8])> {
        let (raw, rest) = self.read_raw(data)?;
        Ok((self.interpret(raw, extractor)?, rest))
    }
}

/// Sign and magnitude of a DECIMAL stored in `raw`.
///
/// The 16-byte form is a pair of 8-byte halves, low half first. The sign of
/// the high half is the sign of the value and its absolute value supplies the
/// upper 64 bits of the magnitude.
fn decimal_parts(raw: &[u8], width: u8) -> Result<(bool, u128)> {
    let parts = match decimal_storage(width) {
        1 => {
            let (v, _) = read_sint_1(raw)?;
            (v < 0, u128::from(v.unsigned_abs()))
        }
        2 => {
            let (v, _) = read_sint_2(raw)?;
            (v < 0, u128::from(v.unsigned_abs()))
        }
        4 => {
            let (v, _) = read_sint_4(raw)?;
            (v < 0, u128::from(v.unsigned_abs()))
        }
        8 => {
            let (v, _) = read_sint_8(raw)?;
            (v < 0, u128::from(v.unsigned_abs()))
        }
        _ => {
            let (lower, rest) = read_int_8(raw)?;
            let (upper, _) = read_sint_8(rest)?;
            (
                upper < 0,
                (u128::from(upper.unsigned_abs()) << 64) | u128::from(lower),
            )
        }
    };
    Ok(parts)
}

fn decode_decimal(raw: &[u8], width: u8, fractional: u8) -> Result<String> {
    let (negative, magnitude) = decimal_parts(raw, width)?;
    Ok(format_decimal(negative, magnitude, fractional))
}

/// Render `magnitude` scaled by `10^-fractional`, e.g. `(true, 5, 2)` as `-0.05`
pub fn format_decimal(negative: bool, magnitude: u128, fractional: u8) -> String {
    let frac = fractional as usize;
    let mut digits = magnitude.to_string();
    if digits.len() <= frac {
        digits = format!("{:0>width$}", digits, width = frac + 1);
    }
    let mut out = String::with_capacity(digits.len() + 2);
    if negative {
        out.push('-');
    }
    if frac == 0 {
        out.push_str(&digits);
    } else {
        let (int_part, frac_part) = digits.split_at(digits.len() - frac);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// DATE is stored as `YYYYMMDD - 19000000` in a signed 4-byte integer
pub const DATE_OFFSET: i64 = 19_000_000;

fn decode_date(raw: &[u8]) -> Result<String> {
    let (stored, _) = read_sint_4(raw)?;
    let n = i64::from(stored) + DATE_OFFSET;
    if !(10_000_000..=99_999_999).contains(&n) {
        return Err(Error::FormatError(format!("date out of range: {}", stored)));
    }
    let year = n / 10_000;
    let month = (n / 100) % 100;
    let day = n % 100;
    Ok(format!("{:04}-{:02}-{:02}", year, month, day))
}

/// Inverse of the DATE decoder for a `YYYY-MM-DD` string
pub fn encode_date(text: &str) -> Result<i32> {
    let bad = || Error::BadUsageError(format!("invalid date: {:?}", text));
    let mut parts = text.splitn(3, '-');
    let mut next = || -> Result<i64> {
        parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(bad)
    };
    let (year, month, day) = (next()?, next()?, next()?);
    let n = year * 10_000 + month * 100 + day - DATE_OFFSET;
    i32::try_from(n).map_err(|_| bad())
}

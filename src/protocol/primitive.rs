use crate::error::{Error, Result};
use zerocopy::FromBytes;
use zerocopy::byteorder::little_endian::{
    F64 as F64LE, I16 as I16LE, I32 as I32LE, I64 as I64LE, U16 as U16LE, U32 as U32LE,
    U64 as U64LE,
};

/// Read 1-byte unsigned integer
pub fn read_int_1(data: &[u8]) -> Result<(u8, &[u8])> {
    match data.split_first() {
        Some((&byte, rest)) => Ok((byte, rest)),
        None => Err(Error::UnexpectedEof),
    }
}

/// Read 2-byte little-endian unsigned integer
pub fn read_int_2(data: &[u8]) -> Result<(u16, &[u8])> {
    let (bytes, rest) = read_string_fix(data, 2)?;
    let value = U16LE::ref_from_bytes(bytes)
        .map_err(|_| Error::UnexpectedEof)?
        .get();
    Ok((value, rest))
}

/// Read 4-byte little-endian unsigned integer
pub fn read_int_4(data: &[u8]) -> Result<(u32, &[u8])> {
    let (bytes, rest) = read_string_fix(data, 4)?;
    let value = U32LE::ref_from_bytes(bytes)
        .map_err(|_| Error::UnexpectedEof)?
        .get();
    Ok((value, rest))
}

/// Read 8-byte little-endian unsigned integer
pub fn read_int_8(data: &[u8]) -> Result<(u64, &[u8])> {
    let (bytes, rest) = read_string_fix(data, 8)?;
    let value = U64LE::ref_from_bytes(bytes)
        .map_err(|_| Error::UnexpectedEof)?
        .get();
    Ok((value, rest))
}

/// Read 1-byte signed integer
pub fn read_sint_1(data: &[u8]) -> Result<(i8, &[u8])> {
    let (value, rest) = read_int_1(data)?;
    Ok((value as i8, rest))
}

/// Read 2-byte little-endian two's complement integer
pub fn read_sint_2(data: &[u8]) -> Result<(i16, &[u8])> {
    let (bytes, rest) = read_string_fix(data, 2)?;
    let value = I16LE::ref_from_bytes(bytes)
        .map_err(|_| Error::UnexpectedEof)?
        .get();
    Ok((value, rest))
}

/// Read 4-byte little-endian two's complement integer
pub fn read_sint_4(data: &[u8]) -> Result<(i32, &[u8])> {
    let (bytes, rest) = read_string_fix(data, 4)?;
    let value = I32LE::ref_from_bytes(bytes)
        .map_err(|_| Error::UnexpectedEof)?
        .get();
    Ok((value, rest))
}

/// Read 8-byte little-endian two's complement integer
pub fn read_sint_8(data: &[u8]) -> Result<(i64, &[u8])> {
    let (bytes, rest) = read_string_fix(data, 8)?;
    let value = I64LE::ref_from_bytes(bytes)
        .map_err(|_| Error::UnexpectedEof)?
        .get();
    Ok((value, rest))
}

/// Read 8-byte little-endian IEEE-754 double
pub fn read_double(data: &[u8]) -> Result<(f64, &[u8])> {
    let (bytes, rest) = read_string_fix(data, 8)?;
    let value = F64LE::ref_from_bytes(bytes)
        .map_err(|_| Error::UnexpectedEof)?
        .get();
    Ok((value, rest))
}

/// Read fixed-length string
pub fn read_string_fix(data: &[u8], len: usize) -> Result<(&[u8], &[u8])> {
    if data.len() < len {
        return Err(Error::UnexpectedEof);
    }
    Ok(data.split_at(len))
}

/// Read string prefixed with a 2-byte little-endian length
pub fn read_string_var(data: &[u8]) -> Result<(&[u8], &[u8])> {
    let (len, rest) = read_int_2(data)?;
    read_string_fix(rest, len as usize)
}

/// Write 1-byte integer
pub fn write_int_1(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

/// Write 2-byte little-endian integer
pub fn write_int_2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Write 4-byte little-endian integer
pub fn write_int_4(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Write 8-byte little-endian integer
pub fn write_int_8(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Write 8-byte little-endian double
pub fn write_double(out: &mut Vec<u8>, value: f64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Write fixed-length bytes
pub fn write_bytes_fix(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(data);
}

/// Write bytes prefixed with a 2-byte little-endian length
pub fn write_bytes_var(out: &mut Vec<u8>, data: &[u8]) {
    write_int_2(out, data.len() as u16);
    out.extend_from_slice(data);
}

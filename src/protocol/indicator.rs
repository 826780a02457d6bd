use crate::error::Result;
use crate::protocol::primitive::read_string_fix;

/// Null indicator bitmap at the head of an indicator-mode Record parcel.
///
/// One bit per column, most significant bit first, padded to whole bytes.
#[derive(Debug, Clone, Copy)]
pub struct NullIndicator<'a> {
    bitmap: &'a [u8],
}

impl<'a> NullIndicator<'a> {
    /// Bytes needed for `num_columns` columns
    pub fn size(num_columns: usize) -> usize {
        num_columns.div_ceil(8)
    }

    pub fn read(data: &'a [u8], num_columns: usize) -> Result<(Self, &'a [u8])> {
        let (bitmap, rest) = read_string_fix(data, Self::size(num_columns))?;
        Ok((Self { bitmap }, rest))
    }

    pub fn is_null(&self, idx: usize) -> bool {
        let mask = 0x80_u8 >> (idx & 7);
        self.bitmap.get(idx >> 3).is_some_and(|byte| byte & mask != 0)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bitmap
    }
}

/// Append the bitmap for `nulls` to `out`
pub fn write_null_indicator(out: &mut Vec<u8>, nulls: &[bool]) {
    let start = out.len();
    out.resize(start + NullIndicator::size(nulls.len()), 0);
    for (idx, _) in nulls.iter().enumerate().filter(|(_, null)| **null) {
        if let Some(byte) = out.get_mut(start + (idx >> 3)) {
            *byte |= 0x80 >> (idx & 7);
        }
    }
}

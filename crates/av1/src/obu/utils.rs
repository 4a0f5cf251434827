use std::io;

use crate::error::{Av1Error, Result};

/// Read a little-endian variable-length integer from the start of `data`.
/// AV1-Spec-2 - 4.10.5
///
/// Returns the decoded value and the number of bytes it occupied.
///
/// Per the AV1 specification, conforming bitstreams produce values `<= (1 << 32) - 1`.
/// This function rejects values exceeding that limit. If `data` ends before
/// the final LEB128 byte, [`Av1Error::NeedMoreData`] is returned with
/// `required` set to one byte past the end of `data`.
pub fn read_leb128(data: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in data.iter().take(8).enumerate() {
        value |= u64::from(byte & 0x7f) << (i * 7);
        // at most 8 bytes are read, the 8th ends the value regardless
        if byte & 0x80 == 0 || i == 7 {
            if value > u32::MAX as u64 {
                return Err(Av1Error::Leb128Overflow);
            }
            return Ok((value, i + 1));
        }
    }

    Err(Av1Error::NeedMoreData {
        required: data.len() + 1,
        available: data.len(),
    })
}

/// Write a little-endian variable-length integer.
/// AV1-Spec-2 - 4.10.5
///
/// Returns the number of bytes written (1-8).
pub fn write_leb128<W: io::Write>(writer: &mut W, mut value: u64) -> io::Result<usize> {
    let mut bytes_written = 0;
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        writer.write_all(&[byte])?;
        bytes_written += 1;
        if value == 0 {
            break;
        }
    }
    Ok(bytes_written)
}

/// Returns the number of bytes needed to encode `value` as LEB128.
pub fn leb128_size(mut value: u64) -> usize {
    let mut size = 1;
    while value >= 0x80 {
        value >>= 7;
        size += 1;
    }
    size
}

//! Zero-compressed variable-length integers
//!
//! Same layout as Hadoop's `WritableUtils.writeVLong`, so files written by
//! either side read on the other:
//!
//! ```text
//! -112..=127        one byte, the value itself
//! otherwise         header byte, then 1-8 magnitude bytes, big-endian
//!   header -113..=-120   positive, (-112 - header) bytes follow
//!   header -121..=-128   negative (one's complement), (-120 - header) bytes follow
//! ```

use recwire_core::DecodeError;
use std::io::{self, Read, Write};

/// Write `value` in vint form
pub(crate) fn write_vint<W: Write>(out: &mut W, value: i64) -> io::Result<()> {
    if (-112..=127).contains(&value) {
        return out.write_all(&[value as u8]);
    }

    let (magnitude, base) = if value < 0 {
        (!value, -120i8)
    } else {
        (value, -112i8)
    };
    let len = 8 - (magnitude.leading_zeros() as usize) / 8;

    let mut buf = [0u8; 9];
    buf[0] = (base - len as i8) as u8;
    buf[1..=len].copy_from_slice(&magnitude.to_be_bytes()[8 - len..]);
    out.write_all(&buf[..=len])
}

/// Read a vint of any width
pub(crate) fn read_vint<R: Read>(input: &mut R) -> Result<i64, DecodeError> {
    let header = read_byte(input)? as i8;
    if header >= -112 {
        return Ok(i64::from(header));
    }

    let (len, negative) = if header < -120 {
        (-120 - i32::from(header), true)
    } else {
        (-112 - i32::from(header), false)
    };

    let mut magnitude: i64 = 0;
    for _ in 0..len {
        magnitude = (magnitude << 8) | i64::from(read_byte(input)?);
    }
    Ok(if negative { !magnitude } else { magnitude })
}

/// Read a vint that must fit in 32 bits
pub(crate) fn read_vint32<R: Read>(input: &mut R) -> Result<i32, DecodeError> {
    let value = read_vint(input)?;
    i32::try_from(value).map_err(|_| DecodeError::IntegerOverflow)
}

fn read_byte<R: Read>(input: &mut R) -> Result<u8, DecodeError> {
    let mut byte = [0u8; 1];
    input.read_exact(&mut byte)?;
    Ok(byte[0])
}

//! Primitives shared by the `ngl::objbin` and `ngl::mtlbin` cache formats
//!
//! Every cache starts with an 11-byte ASCII magic. All numbers are little-endian and
//! strings are a `u32` byte length followed by UTF-8.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::foundation::math::Vec3;

/// Length of every cache magic
pub const MAGIC_LEN: usize = 11;

/// Errors generated when reading or writing a binary cache
#[derive(Error, Debug)]
pub enum BinaryError {
    /// IO error on the underlying stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream does not start with the expected magic
    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic {
        /// Magic the reader wanted
        expected: String,
        /// What was there instead
        found: String,
    },

    /// A length-prefixed string is not valid UTF-8
    #[error("invalid string in binary cache")]
    InvalidString,

    /// A count or index does not fit the format
    #[error("value {0} is too large for the binary format")]
    Overflow(u64),
}

/// Write the 11-byte magic
pub fn write_magic<W: Write>(w: &mut W, magic: &[u8; MAGIC_LEN]) -> Result<(), BinaryError> {
    w.write_all(magic)?;
    Ok(())
}

/// Read and check the 11-byte magic
pub fn read_magic<R: Read>(r: &mut R, magic: &[u8; MAGIC_LEN]) -> Result<(), BinaryError> {
    let mut found = [0u8; MAGIC_LEN];
    r.read_exact(&mut found)?;
    if &found != magic {
        return Err(BinaryError::BadMagic {
            expected: String::from_utf8_lossy(magic).into_owned(),
            found: String::from_utf8_lossy(&found).into_owned(),
        });
    }
    Ok(())
}

/// Write a `usize` as `u32`
pub fn write_u32_len<W: Write>(w: &mut W, value: usize) -> Result<(), BinaryError> {
    let value = u32::try_from(value).map_err(|_| BinaryError::Overflow(value as u64))?;
    w.write_u32::<LittleEndian>(value)?;
    Ok(())
}

/// Read a `u32` as `usize`
pub fn read_u32_len<R: Read>(r: &mut R) -> Result<usize, BinaryError> {
    Ok(r.read_u32::<LittleEndian>()? as usize)
}

/// Write a length-prefixed string
pub fn write_string<W: Write>(w: &mut W, s: &str) -> Result<(), BinaryError> {
    write_u32_len(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

/// Read a length-prefixed string
pub fn read_string<R: Read>(r: &mut R) -> Result<String, BinaryError> {
    let len = read_u32_len(r)?;
    let mut bytes = Vec::new();
    (&mut *r).take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(BinaryError::Io(std::io::ErrorKind::UnexpectedEof.into()));
    }
    String::from_utf8(bytes).map_err(|_| BinaryError::InvalidString)
}

/// Write three `f32`
pub fn write_vec3<W: Write>(w: &mut W, v: &Vec3) -> Result<(), BinaryError> {
    for c in v.iter() {
        w.write_f32::<LittleEndian>(*c)?;
    }
    Ok(())
}

/// Read three `f32`
pub fn read_vec3<R: Read>(r: &mut R) -> Result<Vec3, BinaryError> {
    Ok(Vec3::new(
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
        r.read_f32::<LittleEndian>()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MAGIC: &[u8; MAGIC_LEN] = b"ngl::testbn";

    #[test]
    fn test_magic_mismatch() {
        let mut cursor = Cursor::new(b"ngl::objbin".to_vec());
        let err = read_magic(&mut cursor, MAGIC).unwrap_err();
        assert!(matches!(err, BinaryError::BadMagic { ref found, .. } if found == "ngl::objbin"));
    }

    #[test]
    fn test_string_layout() {
        let mut buffer = Vec::new();
        write_string(&mut buffer, "brick").unwrap();
        assert_eq!(&buffer[..4], &5u32.to_le_bytes());
        assert_eq!(&buffer[4..], b"brick");

        assert_eq!(read_string(&mut Cursor::new(buffer)).unwrap(), "brick");
    }

    #[test]
    fn test_truncated_string() {
        let mut buffer = Vec::new();
        write_string(&mut buffer, "brick").unwrap();
        buffer.truncate(6);
        assert!(matches!(read_string(&mut Cursor::new(buffer)), Err(BinaryError::Io(_))));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut buffer = 2u32.to_le_bytes().to_vec();
        buffer.extend_from_slice(&[0xff, 0xfe]);
        assert!(matches!(read_string(&mut Cursor::new(buffer)), Err(BinaryError::InvalidString)));
    }
}

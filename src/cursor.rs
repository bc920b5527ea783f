//! Primitive readers shared by the PAK and IoStore TOC decoders.
//!
//! Mirrors the shape of the teacher's `BufReaderExt`/`UnrealReadExt`
//! extension traits: a blanket impl over anything that implements
//! [`Read`], so the same helpers work whether the underlying reader is a
//! `BufReader<File>` seeking around on disk (PAK) or a `Cursor<&[u8]>`
//! over a buffer read eagerly up front (UTOC).

use std::io::{self, Read};

use byteorder::{ReadBytesExt, LE};

use crate::error::{Error, Result};

fn map_io(err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => Error::Truncated,
        _ => Error::Io(err),
    }
}

/// Primitive reads used throughout the PAK and TOC decoders.
pub trait PrimitiveRead: Read {
    /// Read a little-endian `u8`
    fn read_u8_le(&mut self) -> Result<u8> {
        ReadBytesExt::read_u8(self).map_err(map_io)
    }
    /// Read a little-endian `i8`
    fn read_i8_le(&mut self) -> Result<i8> {
        ReadBytesExt::read_i8(self).map_err(map_io)
    }
    /// Read a little-endian `u16`
    fn read_u16_le(&mut self) -> Result<u16> {
        ReadBytesExt::read_u16::<LE>(self).map_err(map_io)
    }
    /// Read a little-endian `i16`
    fn read_i16_le(&mut self) -> Result<i16> {
        ReadBytesExt::read_i16::<LE>(self).map_err(map_io)
    }
    /// Read a little-endian `u32`
    fn read_u32_le(&mut self) -> Result<u32> {
        ReadBytesExt::read_u32::<LE>(self).map_err(map_io)
    }
    /// Read a little-endian `i32`
    fn read_i32_le(&mut self) -> Result<i32> {
        ReadBytesExt::read_i32::<LE>(self).map_err(map_io)
    }
    /// Read a little-endian `u64`
    fn read_u64_le(&mut self) -> Result<u64> {
        ReadBytesExt::read_u64::<LE>(self).map_err(map_io)
    }
    /// Read a little-endian `i64`
    fn read_i64_le(&mut self) -> Result<i64> {
        ReadBytesExt::read_i64::<LE>(self).map_err(map_io)
    }

    /// Read exactly `N` raw bytes
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf).map_err(map_io)?;
        Ok(buf)
    }

    /// Read a `Vec<u8>` of the given length
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf).map_err(map_io)?;
        Ok(buf)
    }

    /// Read a 32-bit optional index: `0xFFFFFFFF` means absent (spec §4.1)
    fn read_optional_index(&mut self) -> Result<Option<u32>> {
        let value = self.read_u32_le()?;
        Ok(if value == u32::MAX { None } else { Some(value) })
    }

    /// Read the engine's length-prefixed string encoding (spec §4.1):
    /// `L == 0` is empty, `L > 0` is `L` ASCII/UTF-8 bytes (NUL-terminated,
    /// NUL included in `L`), `L < 0` is `|L|` UTF-16 code units
    /// (NUL-terminated, NUL included in `|L|`). The `L > 0` branch errors on
    /// invalid UTF-8 rather than substituting replacement characters.
    fn read_engine_string(&mut self) -> Result<String> {
        let len = self.read_i32_le()?;

        if len == 0 {
            return Ok(String::new());
        }

        if len > 0 {
            let len = len as usize;
            let bytes = self.read_vec(len)?;
            let nul_at = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            let mut bytes = bytes;
            bytes.truncate(nul_at);
            Ok(String::from_utf8(bytes)?)
        } else {
            let units = (-len) as usize;
            let mut raw = Vec::with_capacity(units);
            for _ in 0..units {
                raw.push(self.read_u16_le()?);
            }
            let nul_at = raw.iter().position(|&u| u == 0).unwrap_or(raw.len());
            Ok(char::decode_utf16(raw[..nul_at].iter().copied())
                .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect())
        }
    }
}

impl<R: Read + ?Sized> PrimitiveRead for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn optional_index_sentinel() {
        let mut cur = Cursor::new(0xFFFFFFFFu32.to_le_bytes());
        assert_eq!(cur.read_optional_index().unwrap(), None);

        let mut cur = Cursor::new(5u32.to_le_bytes());
        assert_eq!(cur.read_optional_index().unwrap(), Some(5));
    }

    #[test]
    fn engine_string_empty() {
        let mut cur = Cursor::new(0i32.to_le_bytes());
        assert_eq!(cur.read_engine_string().unwrap(), "");
    }

    #[test]
    fn engine_string_ascii() {
        let mut bytes = 4i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc\0");
        let mut cur = Cursor::new(bytes);
        assert_eq!(cur.read_engine_string().unwrap(), "abc");
    }

    #[test]
    fn engine_string_invalid_utf8_is_an_error() {
        let mut bytes = 3i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE, 0]);
        let mut cur = Cursor::new(bytes);
        match cur.read_engine_string() {
            Err(Error::Utf8(_)) => {}
            other => panic!("expected Utf8 error, got {other:?}"),
        }
    }

    #[test]
    fn engine_string_utf16() {
        let data: Vec<u16> = "hé\0".encode_utf16().collect();
        let mut bytes = (-(data.len() as i32)).to_le_bytes().to_vec();
        for unit in &data {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let mut cur = Cursor::new(bytes);
        assert_eq!(cur.read_engine_string().unwrap(), "h\u{e9}");
    }

    #[test]
    fn truncated_read_is_truncated_error() {
        let mut cur = Cursor::new([0u8; 2]);
        match cur.read_u32_le() {
            Err(Error::Truncated) => {}
            other => panic!("expected Truncated, got {other:?}"),
        }
    }
}

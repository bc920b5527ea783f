//! Compression-method name table (spec §4.2).
//!
//! The footer carries an ordered table of up to 5 compression-method names,
//! each a 32-byte NUL-padded ASCII string. Entries resolve a "compression
//! slot" index into this table (spec §4.5). Actual decompression is out of
//! scope (spec §1 Non-goals) — this crate only identifies which named method,
//! if any, an entry declares.

use std::io::Read;

use crate::cursor::PrimitiveRead;
use crate::error::Result;

/// One named compression method a PAK footer can declare.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompressionMethodName {
    /// Zlib
    Zlib,
    /// Gzip
    Gzip,
    /// Oodle
    Oodle,
    /// Zstd
    Zstd,
    /// LZ4
    Lz4,
}

impl CompressionMethodName {
    const KNOWN: &'static [(&'static str, CompressionMethodName)] = &[
        ("Zlib", CompressionMethodName::Zlib),
        ("Gzip", CompressionMethodName::Gzip),
        ("Oodle", CompressionMethodName::Oodle),
        ("Zstd", CompressionMethodName::Zstd),
        ("LZ4", CompressionMethodName::Lz4),
    ];

    fn from_exact_name(name: &str) -> Option<Self> {
        Self::KNOWN
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, method)| *method)
    }

    /// The canonical wire name for this method.
    pub fn as_str(self) -> &'static str {
        Self::KNOWN
            .iter()
            .find(|(_, method)| *method == self)
            .map(|(name, _)| *name)
            .expect("every variant has a known name")
    }
}

/// Read one 32-byte NUL-padded compression-method name slot. Empty or
/// unrecognized (case-sensitive exact match required) names yield `None`.
pub fn read_compression_name_slot<R: Read>(reader: &mut R) -> Result<Option<CompressionMethodName>> {
    let raw = reader.read_array::<32>()?;
    let nul_at = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    if nul_at == 0 {
        return Ok(None);
    }
    let name = String::from_utf8_lossy(&raw[..nul_at]);
    Ok(CompressionMethodName::from_exact_name(&name))
}

/// Compression table synthesized for footers older than
/// `FnameBasedCompressionMethod`, which declare no table of their own but
/// whose entries may still reference slot indices (spec §4.2).
pub fn synthesized_legacy_table() -> Vec<Option<CompressionMethodName>> {
    vec![
        Some(CompressionMethodName::Zlib),
        Some(CompressionMethodName::Gzip),
        Some(CompressionMethodName::Oodle),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn padded(name: &str) -> [u8; 32] {
        let mut buf = [0u8; 32];
        buf[..name.len()].copy_from_slice(name.as_bytes());
        buf
    }

    #[test]
    fn known_name_resolves() {
        let mut cur = Cursor::new(padded("Zstd"));
        assert_eq!(
            read_compression_name_slot(&mut cur).unwrap(),
            Some(CompressionMethodName::Zstd)
        );
    }

    #[test]
    fn empty_slot_is_absent() {
        let mut cur = Cursor::new([0u8; 32]);
        assert_eq!(read_compression_name_slot(&mut cur).unwrap(), None);
    }

    #[test]
    fn unknown_name_is_absent() {
        let mut cur = Cursor::new(padded("Brotli"));
        assert_eq!(read_compression_name_slot(&mut cur).unwrap(), None);
    }

    #[test]
    fn case_sensitive_match() {
        let mut cur = Cursor::new(padded("zlib"));
        assert_eq!(read_compression_name_slot(&mut cur).unwrap(), None);
    }
}

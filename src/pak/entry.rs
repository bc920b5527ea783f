//! PAK per-file entry decoder (spec §4.5).

use std::io::Read;

use crate::cursor::PrimitiveRead;
use crate::error::{Error, Result};
use crate::pak::version::{has_compression_block_fields, has_timestamp, PakVersion};

/// One compression block within an entry's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PakBlock {
    /// Start offset of the block
    pub start: u64,
    /// End offset of the block
    pub end: u64,
}

/// Bit 0 of [`PakEntry::flags`]: the entry's data is encrypted.
pub const ENTRY_FLAG_ENCRYPTED: u8 = 1 << 0;
/// Bit 1 of [`PakEntry::flags`]: the entry is a delete record.
pub const ENTRY_FLAG_DELETED: u8 = 1 << 1;

/// A decoded PAK entry: the physical layout of one archived file.
#[derive(Debug, Clone)]
pub struct PakEntry {
    /// Byte offset of the entry's header within the PAK file
    pub offset: u64,
    /// Compressed size in bytes
    pub compressed_size: u64,
    /// Uncompressed size in bytes
    pub uncompressed_size: u64,
    /// Zero-based index into the footer's compression-method table, if compressed
    pub compression_slot: Option<usize>,
    /// Legacy per-entry timestamp, only present on [`PakVersion::Initial`]
    pub timestamp: Option<u64>,
    /// Content hash (20 bytes)
    pub hash: [u8; 20],
    /// Compression blocks, present iff `compression_slot.is_some()` and the
    /// version supports compression
    pub blocks: Option<Vec<PakBlock>>,
    /// Flag byte: bit 0 encrypted, bit 1 deleted
    pub flags: u8,
    /// Compression block size
    pub compression_block_size: u32,
    /// Set only for placeholder entries built from the PathHashIndex
    /// full-directory-index branch (spec §4.4, §9): the packed descriptor
    /// this decoder does not unpack. When `Some`, every other field above
    /// is meaningless zero.
    pub raw_offset_descriptor: Option<u32>,
}

impl PakEntry {
    /// Whether bit 0 of [`PakEntry::flags`] is set.
    pub fn is_encrypted(&self) -> bool {
        self.flags & ENTRY_FLAG_ENCRYPTED != 0
    }

    /// Whether bit 1 of [`PakEntry::flags`] is set.
    pub fn is_deleted(&self) -> bool {
        self.flags & ENTRY_FLAG_DELETED != 0
    }

    /// Decode one entry record at the reader's current position.
    pub fn read<R: Read>(reader: &mut R, version: PakVersion, compression_len: usize) -> Result<Self> {
        let offset = reader.read_u64_le()?;
        let compressed_size = reader.read_u64_le()?;
        let uncompressed_size = reader.read_u64_le()?;

        let slot_raw = if version == PakVersion::FnameBasedCompressionMethodInitial {
            reader.read_u8_le()? as u32
        } else {
            reader.read_u32_le()?
        };
        let compression_slot = if slot_raw == 0 {
            None
        } else {
            let slot = slot_raw as usize - 1;
            if slot >= compression_len {
                return Err(Error::invalid_record(format!(
                    "compression slot {slot} out of range (table has {compression_len} entries)"
                )));
            }
            Some(slot)
        };

        let timestamp = if has_timestamp(version) {
            Some(reader.read_u64_le()?)
        } else {
            None
        };

        let hash = reader.read_array::<20>()?;

        let mut blocks = None;
        let mut flags = 0u8;
        let mut compression_block_size = 0u32;

        if has_compression_block_fields(version) {
            if compression_slot.is_some() {
                let block_count = reader.read_u32_le()? as usize;
                let mut inner = Vec::with_capacity(block_count);
                for _ in 0..block_count {
                    let start = reader.read_u64_le()?;
                    let end = reader.read_u64_le()?;
                    if end < start {
                        return Err(Error::invalid_record(format!(
                            "compression block end {end} before start {start}"
                        )));
                    }
                    inner.push(PakBlock { start, end });
                }
                blocks = Some(inner);
            }

            flags = reader.read_u8_le()?;
            compression_block_size = reader.read_u32_le()?;
        }

        Ok(PakEntry {
            offset,
            compressed_size,
            uncompressed_size,
            compression_slot,
            timestamp,
            hash,
            blocks,
            flags,
            compression_block_size,
            raw_offset_descriptor: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn build_entry_bytes(slot: u32, blocks: &[(u64, u64)]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&10u64.to_le_bytes()); // offset
        buf.extend_from_slice(&150u64.to_le_bytes()); // compressed
        buf.extend_from_slice(&300u64.to_le_bytes()); // uncompressed
        buf.extend_from_slice(&slot.to_le_bytes());
        buf.extend_from_slice(&[0u8; 20]); // hash
        if slot != 0 {
            buf.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
            for (s, e) in blocks {
                buf.extend_from_slice(&s.to_le_bytes());
                buf.extend_from_slice(&e.to_le_bytes());
            }
        }
        buf.push(0); // flags
        buf.extend_from_slice(&0x10000u32.to_le_bytes()); // block size
        buf
    }

    #[test]
    fn decodes_compressed_entry_with_blocks() {
        let bytes = build_entry_bytes(2, &[(100, 200), (200, 350)]);
        let mut cur = Cursor::new(bytes);
        let entry = PakEntry::read(&mut cur, PakVersion::CompressionEncryption, 5).unwrap();
        assert_eq!(entry.compression_slot, Some(1));
        let blocks = entry.blocks.unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], PakBlock { start: 100, end: 200 });
        assert_eq!(blocks[1], PakBlock { start: 200, end: 350 });
    }

    #[test]
    fn uncompressed_entry_has_no_blocks() {
        let bytes = build_entry_bytes(0, &[]);
        let mut cur = Cursor::new(bytes);
        let entry = PakEntry::read(&mut cur, PakVersion::CompressionEncryption, 5).unwrap();
        assert_eq!(entry.compression_slot, None);
        assert!(entry.blocks.is_none());
    }

    #[test]
    fn slot_out_of_range_is_rejected() {
        let bytes = build_entry_bytes(7, &[(0, 1)]);
        let mut cur = Cursor::new(bytes);
        let err = PakEntry::read(&mut cur, PakVersion::CompressionEncryption, 5).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
    }

    #[test]
    fn pre_compression_version_has_no_block_fields() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&10u64.to_le_bytes());
        buf.extend_from_slice(&10u64.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&99u64.to_le_bytes()); // timestamp (Initial only)
        buf.extend_from_slice(&[0u8; 20]);
        let mut cur = Cursor::new(buf);
        let entry = PakEntry::read(&mut cur, PakVersion::Initial, 0).unwrap();
        assert_eq!(entry.timestamp, Some(99));
        assert_eq!(entry.flags, 0);
        assert_eq!(entry.compression_block_size, 0);
    }
}

//! UTOC fixed 144-byte header decoder (spec §4.6).

use std::fmt;
use std::io::Read;

use bitflags::bitflags;

use crate::cursor::PrimitiveRead;
use crate::error::{Error, Result};

/// UTOC magic constant: 16 ASCII bytes at offset 0.
pub const TOC_MAGIC: [u8; 16] = *b"-==--==--==--==-";

/// Declared size of the fixed header, in bytes.
pub const TOC_HEADER_SIZE: u32 = 144;

/// UTOC format version, in wire order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TocVersion {
    /// Pre-versioning legacy layout
    Legacy = 0,
    /// Directory index added
    DirectoryIndex = 1,
    /// Partition size field added
    PartitionSize = 2,
    /// Perfect hash chunk lookup added
    PerfectHash = 3,
    /// Perfect hash with an overflow list for unresolved chunks
    PerfectHashWithOverflow = 4,
    /// On-demand metadata section added
    OnDemandMetaData = 5,
    /// On-demand metadata section removed again
    RemovedOnDemandMetaData = 6,
    /// Chunk hash replaced by a shorter io-hash
    ReplaceIoChunkHashWithIoHash = 7,
    /// One past the last known version; never a valid decoded value
    LatestPlusOne = 8,
}

impl TocVersion {
    /// Convert a wire byte into a [`TocVersion`].
    pub fn from_num(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Legacy),
            1 => Ok(Self::DirectoryIndex),
            2 => Ok(Self::PartitionSize),
            3 => Ok(Self::PerfectHash),
            4 => Ok(Self::PerfectHashWithOverflow),
            5 => Ok(Self::OnDemandMetaData),
            6 => Ok(Self::RemovedOnDemandMetaData),
            7 => Ok(Self::ReplaceIoChunkHashWithIoHash),
            other => Err(Error::UnsupportedVersion(other as u32)),
        }
    }
}

impl fmt::Display for TocVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", *self as u8)
    }
}

bitflags! {
    /// Container-level flags (spec §4.6). Only bits 0-3 carry meaning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContainerFlags: u8 {
        /// Chunks in the data file are compressed
        const COMPRESSED = 1 << 0;
        /// Chunks in the data file are encrypted
        const ENCRYPTED = 1 << 1;
        /// The TOC carries signature blocks
        const SIGNED = 1 << 2;
        /// A directory index is present
        const INDEXED = 1 << 3;
    }
}

/// The decoded 144-byte fixed header.
#[derive(Debug, Clone)]
pub struct TocHeader {
    /// Format version
    pub version: TocVersion,
    /// Number of chunk-id / offset-length records
    pub toc_entry_count: u32,
    /// Number of compressed-block-entry records
    pub toc_compressed_block_entry_count: u32,
    /// Number of compression-method names declared
    pub compression_method_name_count: u32,
    /// Byte length of each compression-method name
    pub compression_method_name_length: u32,
    /// Compression block size in bytes
    pub compression_block_size: u32,
    /// Byte length of the directory-index section
    pub directory_index_size: u32,
    /// Number of data partitions
    pub partition_count: u32,
    /// Container identifier
    pub container_id: u64,
    /// Encryption key GUID
    pub encryption_key_guid: [u8; 16],
    /// Container-level flags
    pub container_flags: ContainerFlags,
    /// Number of perfect-hash seeds
    pub perfect_hash_seeds_count: u32,
    /// Number of chunks with no perfect-hash match
    pub chunks_without_perfect_hash_count: u32,
    /// Size in bytes of one partition
    pub partition_size: u64,
}

impl TocHeader {
    /// Decode the 144-byte header at the reader's current position (expected
    /// to be offset 0).
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_array::<16>()?;
        if magic != TOC_MAGIC {
            return Err(Error::bad_magic(TOC_MAGIC.to_vec(), magic.to_vec()));
        }

        let version_byte = reader.read_u8_le()?;
        let version = TocVersion::from_num(version_byte)?;

        let header_size = reader.read_u32_le()?;
        if header_size != TOC_HEADER_SIZE {
            return Err(Error::invalid_record(format!(
                "declared header size {header_size} != {TOC_HEADER_SIZE}"
            )));
        }

        let toc_entry_count = reader.read_u32_le()?;
        let toc_compressed_block_entry_count = reader.read_u32_le()?;
        let compression_method_name_count = reader.read_u32_le()?;
        let compression_method_name_length = reader.read_u32_le()?;
        let compression_block_size = reader.read_u32_le()?;
        let directory_index_size = reader.read_u32_le()?;
        let partition_count = reader.read_u32_le()?;
        let container_id = reader.read_u64_le()?;
        let encryption_key_guid = reader.read_array::<16>()?;

        let flags_byte = reader.read_u8_le()?;
        let container_flags = ContainerFlags::from_bits_truncate(flags_byte);

        // Padding / reserved bytes to reach declared field offsets.
        let _reserved0 = reader.read_array::<3>()?;

        let perfect_hash_seeds_count = reader.read_u32_le()?;
        let chunks_without_perfect_hash_count = reader.read_u32_le()?;
        let partition_size = reader.read_u64_le()?;

        // Remaining reserved bytes padding the struct out to 144 bytes.
        let consumed = 16 + 1 + 4 + 4 + 4 + 4 + 4 + 4 + 4 + 4 + 8 + 16 + 1 + 3 + 4 + 4 + 8;
        let remaining = TOC_HEADER_SIZE as usize - consumed;
        let mut pad = vec![0u8; remaining];
        reader.read_exact(&mut pad).map_err(|_| Error::Truncated)?;

        Ok(TocHeader {
            version,
            toc_entry_count,
            toc_compressed_block_entry_count,
            compression_method_name_count,
            compression_method_name_length,
            compression_block_size,
            directory_index_size,
            partition_count,
            container_id,
            encryption_key_guid,
            container_flags,
            perfect_hash_seeds_count,
            chunks_without_perfect_hash_count,
            partition_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write_header(version: u8, entry_count: u32, flags: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&TOC_MAGIC);
        buf.push(version);
        buf.extend_from_slice(&TOC_HEADER_SIZE.to_le_bytes());
        buf.extend_from_slice(&entry_count.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes()); // compressed block entries
        buf.extend_from_slice(&0u32.to_le_bytes()); // compression method count
        buf.extend_from_slice(&0u32.to_le_bytes()); // compression method name length
        buf.extend_from_slice(&0u32.to_le_bytes()); // compression block size
        buf.extend_from_slice(&0u32.to_le_bytes()); // directory index size
        buf.extend_from_slice(&1u32.to_le_bytes()); // partition count
        buf.extend_from_slice(&0u64.to_le_bytes()); // container id
        buf.extend_from_slice(&[0u8; 16]); // encryption guid
        buf.push(flags);
        buf.extend_from_slice(&[0u8; 3]); // reserved
        buf.extend_from_slice(&0u32.to_le_bytes()); // perfect hash seeds
        buf.extend_from_slice(&0u32.to_le_bytes()); // overflow count
        buf.extend_from_slice(&0u64.to_le_bytes()); // partition size
        while buf.len() < TOC_HEADER_SIZE as usize {
            buf.push(0);
        }
        buf
    }

    #[test]
    fn decodes_valid_header() {
        let bytes = write_header(4, 2, ContainerFlags::INDEXED.bits());
        let mut cur = Cursor::new(bytes);
        let header = TocHeader::read(&mut cur).unwrap();
        assert_eq!(header.version, TocVersion::PerfectHashWithOverflow);
        assert_eq!(header.toc_entry_count, 2);
        assert!(header.container_flags.contains(ContainerFlags::INDEXED));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = write_header(4, 0, 0);
        bytes[0] = b'!';
        let mut cur = Cursor::new(bytes);
        let err = TocHeader::read(&mut cur).unwrap_err();
        assert!(matches!(err, Error::BadMagic { .. }));
    }

    #[test]
    fn rejects_unknown_version() {
        let bytes = write_header(200, 0, 0);
        let mut cur = Cursor::new(bytes);
        let err = TocHeader::read(&mut cur).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(200)));
    }
}

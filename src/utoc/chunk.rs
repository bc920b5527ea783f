//! Chunk identifiers and their packed descriptor records (spec §3, §4.7).

use std::io::Read;

use crate::cursor::PrimitiveRead;
use crate::error::Result;
use crate::utoc::header::TocVersion;

/// A 14-way chunk-type enumeration. Unknown raw values are preserved rather
/// than rejected (spec §3: "unknown types are preserved as raw").
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ChunkType {
    /// No associated type
    Invalid,
    /// Serialized package installation data
    InstallBundleData,
    /// A regular loose file
    LoaderGlobalMeta,
    /// Bulk data attached to a package
    BulkData,
    /// Optional bulk data
    OptionalBulkData,
    /// Memory-mapped bulk data
    MemoryMappedBulkData,
    /// Loader's global names section
    LoaderGlobalNames,
    /// Loader's global name hashes section
    LoaderGlobalNameHashes,
    /// Loader initial load meta
    LoaderInitialLoadMeta,
    /// A package summary
    PackageSummary,
    /// The loader's container header
    LoaderContainerHeader,
    /// On-demand external resource
    ExternalFile,
    /// Shader code library
    ShaderCodeLibrary,
    /// Shader code
    ShaderCode,
    /// Resource referenced by a package but stored separately
    PackageResource,
    /// A recognized-shape but unmapped value, preserved verbatim
    Unknown(u8),
}

impl ChunkType {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Invalid,
            1 => Self::InstallBundleData,
            2 => Self::LoaderGlobalMeta,
            3 => Self::BulkData,
            4 => Self::OptionalBulkData,
            5 => Self::MemoryMappedBulkData,
            6 => Self::LoaderGlobalNames,
            7 => Self::LoaderGlobalNameHashes,
            8 => Self::LoaderInitialLoadMeta,
            9 => Self::PackageSummary,
            10 => Self::LoaderContainerHeader,
            11 => Self::ExternalFile,
            12 => Self::ShaderCodeLibrary,
            13 => Self::ShaderCode,
            14 => Self::PackageResource,
            other => Self::Unknown(other),
        }
    }
}

/// A 12-byte raw chunk-id record, decomposed lazily into sub-fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkId {
    raw: [u8; 12],
}

impl ChunkId {
    /// Read one 12-byte chunk-id record.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(ChunkId { raw: reader.read_array::<12>()? })
    }

    /// The raw 8-byte id (bytes 0..8).
    pub fn id(&self) -> u64 {
        u64::from_le_bytes(self.raw[0..8].try_into().unwrap())
    }

    /// The 2-byte index (bytes 8..10).
    pub fn index(&self) -> u16 {
        u16::from_le_bytes(self.raw[8..10].try_into().unwrap())
    }

    /// The 6-bit chunk type packed into the low bits of byte 10.
    pub fn chunk_type(&self) -> ChunkType {
        ChunkType::from_raw(self.raw[10] & 0b0011_1111)
    }

    /// Bit 6 of byte 11: whether version info is present.
    pub fn has_version_info(&self) -> bool {
        self.raw[11] & 0b0100_0000 != 0
    }

    /// The raw 12 bytes, unchanged.
    pub fn raw_bytes(&self) -> [u8; 12] {
        self.raw
    }

    /// FNV-1a hash of the raw 12 bytes, for callers that want a compact key
    /// into their own side tables.
    pub fn hash(&self) -> u64 {
        const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;
        self.raw.iter().fold(FNV_OFFSET_BASIS, |acc, &byte| {
            (acc ^ byte as u64).wrapping_mul(FNV_PRIME)
        })
    }
}

fn read_uint40<R: Read>(reader: &mut R) -> Result<u64> {
    let bytes = reader.read_array::<5>()?;
    let mut widened = [0u8; 8];
    widened[..5].copy_from_slice(&bytes);
    Ok(u64::from_le_bytes(widened))
}

/// A 10-byte record: 40-bit offset + 40-bit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetAndLength {
    /// Offset into the data file
    pub offset: u64,
    /// Length in bytes
    pub length: u64,
}

impl OffsetAndLength {
    /// Read one 10-byte record.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let offset = read_uint40(reader)?;
        let length = read_uint40(reader)?;
        Ok(OffsetAndLength { offset, length })
    }
}

fn read_uint24<R: Read>(reader: &mut R) -> Result<u32> {
    let bytes = reader.read_array::<3>()?;
    let mut widened = [0u8; 4];
    widened[..3].copy_from_slice(&bytes);
    Ok(u32::from_le_bytes(widened))
}

/// A 12-byte record: 40-bit offset, 24-bit compressed size, 24-bit
/// uncompressed size, 8-bit compression-method index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedBlockEntry {
    /// Offset into the data file
    pub offset: u64,
    /// Compressed size in bytes
    pub compressed_size: u32,
    /// Uncompressed size in bytes
    pub uncompressed_size: u32,
    /// 0 = uncompressed, else one-based index into the compression-method table
    pub compression_method_index: u8,
}

impl CompressedBlockEntry {
    /// Read one 12-byte record.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let offset = read_uint40(reader)?;
        let compressed_size = read_uint24(reader)?;
        let uncompressed_size = read_uint24(reader)?;
        let compression_method_index = reader.read_u8_le()?;
        Ok(CompressedBlockEntry {
            offset,
            compressed_size,
            uncompressed_size,
            compression_method_index,
        })
    }
}

/// Bit 0 of [`ChunkMeta::flags`]: the chunk is compressed.
pub const CHUNK_META_FLAG_COMPRESSED: u8 = 1 << 0;
/// Bit 1 of [`ChunkMeta::flags`]: the chunk is memory-mapped.
pub const CHUNK_META_FLAG_MEMORY_MAPPED: u8 = 1 << 1;

/// Per-chunk metadata, shape gated by [`TocVersion::ReplaceIoChunkHashWithIoHash`].
#[derive(Debug, Clone)]
pub struct ChunkMeta {
    /// Content hash: 32 bytes pre-`ReplaceIoChunkHashWithIoHash`, 20 bytes after
    pub hash: Vec<u8>,
    /// Flag byte: bit 0 compressed, bit 1 memory-mapped
    pub flags: u8,
}

impl ChunkMeta {
    /// Whether [`ChunkMeta::flags`] bit 0 is set.
    pub fn is_compressed(&self) -> bool {
        self.flags & CHUNK_META_FLAG_COMPRESSED != 0
    }

    /// Whether [`ChunkMeta::flags`] bit 1 is set.
    pub fn is_memory_mapped(&self) -> bool {
        self.flags & CHUNK_META_FLAG_MEMORY_MAPPED != 0
    }

    /// Read one chunk-meta record for the given TOC version.
    pub fn read<R: Read>(reader: &mut R, version: TocVersion) -> Result<Self> {
        if version >= TocVersion::ReplaceIoChunkHashWithIoHash {
            let hash = reader.read_vec(20)?;
            let flags = reader.read_u8_le()?;
            let _pad = reader.read_array::<3>()?;
            Ok(ChunkMeta { hash, flags })
        } else {
            let hash = reader.read_vec(32)?;
            let flags = reader.read_u8_le()?;
            Ok(ChunkMeta { hash, flags })
        }
    }
}

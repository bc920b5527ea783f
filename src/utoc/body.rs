//! UTOC body decoder (spec §4.7): nine sequential variable-length sections.

use std::io::{Cursor, Read};

use crate::cursor::PrimitiveRead;
use crate::error::{Error, Result};
use crate::utoc::chunk::{ChunkId, ChunkMeta, CompressedBlockEntry, OffsetAndLength};
use crate::utoc::directory::DirectoryIndex;
use crate::utoc::header::{ContainerFlags, TocHeader, TocVersion};

/// Everything decoded from the body sections, beyond the fixed header.
#[derive(Debug, Clone)]
pub struct TocBody {
    /// One entry per declared chunk
    pub chunk_ids: Vec<ChunkId>,
    /// One entry per declared chunk
    pub offsets_and_lengths: Vec<OffsetAndLength>,
    /// Perfect-hash seeds, if the version carries a hash map section
    pub perfect_hash_seeds: Vec<i32>,
    /// Indices of chunks that did not resolve via the perfect hash
    pub chunks_without_perfect_hash: Vec<u32>,
    /// Compressed-block descriptors
    pub compressed_block_entries: Vec<CompressedBlockEntry>,
    /// Declared compression-method names, NUL-padded-stripped
    pub compression_method_names: Vec<String>,
    /// Directory index. Empty when the container is unindexed or carries no
    /// directory index section (spec §6: the public view always returns one).
    pub directory_index: DirectoryIndex,
    /// Per-chunk metadata
    pub chunk_meta: Vec<ChunkMeta>,
}

impl TocBody {
    /// Decode every body section following `header`, from `reader` positioned
    /// just past the 144-byte header.
    pub fn read<R: Read>(reader: &mut R, header: &TocHeader) -> Result<Self> {
        let entry_count = header.toc_entry_count as usize;

        let mut chunk_ids = Vec::with_capacity(entry_count);
        for _ in 0..entry_count {
            chunk_ids.push(ChunkId::read(reader)?);
        }

        let mut offsets_and_lengths = Vec::with_capacity(entry_count);
        for _ in 0..entry_count {
            offsets_and_lengths.push(OffsetAndLength::read(reader)?);
        }

        let mut perfect_hash_seeds = Vec::new();
        let mut chunks_without_perfect_hash = Vec::new();
        if header.version >= TocVersion::PerfectHashWithOverflow {
            for _ in 0..header.perfect_hash_seeds_count {
                perfect_hash_seeds.push(reader.read_i32_le()?);
            }
            for _ in 0..header.chunks_without_perfect_hash_count {
                chunks_without_perfect_hash.push(reader.read_u32_le()?);
            }
        } else if header.version == TocVersion::PerfectHash {
            for _ in 0..header.perfect_hash_seeds_count {
                perfect_hash_seeds.push(reader.read_i32_le()?);
            }
        }

        let mut compressed_block_entries =
            Vec::with_capacity(header.toc_compressed_block_entry_count as usize);
        for _ in 0..header.toc_compressed_block_entry_count {
            compressed_block_entries.push(CompressedBlockEntry::read(reader)?);
        }

        let mut compression_method_names =
            Vec::with_capacity(header.compression_method_name_count as usize);
        for _ in 0..header.compression_method_name_count {
            let raw = reader.read_vec(header.compression_method_name_length as usize)?;
            let nul_at = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
            compression_method_names.push(String::from_utf8_lossy(&raw[..nul_at]).into_owned());
        }

        if header.container_flags.contains(ContainerFlags::ENCRYPTED) {
            return Err(Error::EncryptedContainer {
                encryption_guid: Some(header.encryption_key_guid),
            });
        }

        if header.container_flags.contains(ContainerFlags::SIGNED) {
            let signature_size = reader.read_u32_le()? as usize;
            // Width of the trailing size field is uncertain in one known
            // variant of this format (spec §9); 4 bytes matches the other.
            let _ = reader.read_vec(2 * signature_size + 4)?;
            let _ = reader.read_vec(header.toc_compressed_block_entry_count as usize * 20)?;
        }

        let directory_index = if header.container_flags.contains(ContainerFlags::INDEXED)
            && header.directory_index_size > 0
        {
            let raw = reader.read_vec(header.directory_index_size as usize)?;
            let mut sub = Cursor::new(raw);
            DirectoryIndex::read(&mut sub)?
        } else {
            DirectoryIndex::empty()
        };

        let mut chunk_meta = Vec::with_capacity(entry_count);
        for _ in 0..entry_count {
            chunk_meta.push(ChunkMeta::read(reader, header.version)?);
        }

        Ok(TocBody {
            chunk_ids,
            offsets_and_lengths,
            perfect_hash_seeds,
            chunks_without_perfect_hash,
            compressed_block_entries,
            compression_method_names,
            directory_index,
            chunk_meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utoc::header::TOC_MAGIC;

    fn header_with(version: TocVersion, entry_count: u32, flags: ContainerFlags) -> TocHeader {
        TocHeader {
            version,
            toc_entry_count: entry_count,
            toc_compressed_block_entry_count: 0,
            compression_method_name_count: 0,
            compression_method_name_length: 0,
            compression_block_size: 0,
            directory_index_size: 0,
            partition_count: 1,
            container_id: 0,
            encryption_key_guid: [0u8; 16],
            container_flags: flags,
            perfect_hash_seeds_count: 0,
            chunks_without_perfect_hash_count: 0,
            partition_size: 0,
        }
    }

    #[test]
    fn unindexed_body_has_empty_directory_index() {
        let header = header_with(TocVersion::PerfectHash, 0, ContainerFlags::empty());
        let mut cur = Cursor::new(Vec::<u8>::new());
        let body = TocBody::read(&mut cur, &header).unwrap();
        assert!(body.directory_index.directory_entries.is_empty());
        assert!(body.chunk_ids.is_empty());
    }

    #[test]
    fn encrypted_container_is_refused() {
        let header = header_with(TocVersion::PerfectHash, 0, ContainerFlags::ENCRYPTED);
        let mut cur = Cursor::new(Vec::<u8>::new());
        let err = TocBody::read(&mut cur, &header).unwrap_err();
        assert!(matches!(err, Error::EncryptedContainer { .. }));
    }

    #[test]
    fn legacy_version_has_no_hash_map_section() {
        let header = header_with(TocVersion::DirectoryIndex, 0, ContainerFlags::empty());
        let mut cur = Cursor::new(Vec::<u8>::new());
        let body = TocBody::read(&mut cur, &header).unwrap();
        assert!(body.perfect_hash_seeds.is_empty());
        let _ = TOC_MAGIC;
    }
}

//! PAK index decoder (spec §4.4): legacy flat list and path-hash/full-directory split.

use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom};

use crate::cursor::PrimitiveRead;
use crate::error::Result;
use crate::pak::entry::PakEntry;
use crate::pak::version::{is_path_hash_index, PakVersion};

/// Sentinel marking an invalid file slot in the full-directory-index branch.
pub const INVALID_OFFSET_SENTINEL: u32 = 0x8000_0000;

/// Decoded index: mount point plus the ordered path → entry map.
#[derive(Debug, Clone)]
pub struct PakIndex {
    /// Mount-point string, as declared by the index
    pub mount_point: String,
    /// Path → entry, insertion ordered
    pub entries: Vec<(String, PakEntry)>,
}

fn normalize_path(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

impl PakIndex {
    /// Decode the index at the reader's current position (already seeked to
    /// `footer.index_offset` by the caller).
    pub fn read<R: Read + Seek>(
        reader: &mut R,
        version: PakVersion,
        compression_len: usize,
    ) -> Result<Self> {
        let mount_point = reader.read_engine_string()?;
        let entry_count = reader.read_u32_le()?;

        if !is_path_hash_index(version) {
            return Self::read_legacy(reader, version, compression_len, mount_point, entry_count);
        }

        Self::read_path_hash(reader, mount_point)
    }

    fn read_legacy<R: Read>(
        reader: &mut R,
        version: PakVersion,
        compression_len: usize,
        mount_point: String,
        entry_count: u32,
    ) -> Result<Self> {
        let mut map: BTreeMap<String, PakEntry> = BTreeMap::new();
        let mut order = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            let path = normalize_path(&reader.read_engine_string()?);
            let entry = PakEntry::read(reader, version, compression_len)?;
            if !map.contains_key(&path) {
                order.push(path.clone());
            }
            map.insert(path, entry);
        }
        let entries = order
            .into_iter()
            .map(|path| {
                let entry = map.remove(&path).expect("path was just inserted");
                (path, entry)
            })
            .collect();
        Ok(PakIndex { mount_point, entries })
    }

    fn read_path_hash<R: Read + Seek>(reader: &mut R, mount_point: String) -> Result<Self> {
        let _path_hash_seed = reader.read_u64_le()?;

        let has_path_hash_index = reader.read_u32_le()?;
        if has_path_hash_index != 0 {
            let _offset = reader.read_u64_le()?;
            let _size = reader.read_u64_le()?;
            let _hash = reader.read_array::<20>()?;
        }

        let has_full_directory_index = reader.read_u32_le()?;
        let mut entries = Vec::new();
        if has_full_directory_index != 0 {
            let offset = reader.read_u64_le()?;
            let _size = reader.read_u64_le()?;
            let _hash = reader.read_array::<20>()?;

            let return_pos = reader.stream_position()?;
            reader.seek(SeekFrom::Start(offset))?;

            let directory_count = reader.read_u32_le()?;
            for _ in 0..directory_count {
                let dir_path = reader.read_engine_string()?;
                let file_count = reader.read_u32_le()?;
                for _ in 0..file_count {
                    let file_name = reader.read_engine_string()?;
                    let encoded_offset = reader.read_u32_le()?;
                    if encoded_offset == INVALID_OFFSET_SENTINEL {
                        continue;
                    }
                    let full_path = normalize_path(&format!(
                        "{}/{}",
                        dir_path.trim_end_matches('/'),
                        file_name
                    ));
                    entries.push((full_path, PakEntry::placeholder(encoded_offset)));
                }
            }

            reader.seek(SeekFrom::Start(return_pos))?;
        }

        Ok(PakIndex { mount_point, entries })
    }
}

impl PakEntry {
    /// A placeholder entry for full-directory-index records this decoder
    /// does not fully unpack (spec §4.4, §9 open question). The raw encoded
    /// offset is preserved; size/offset fields are meaningless zero.
    pub fn placeholder(raw_offset_descriptor: u32) -> Self {
        PakEntry {
            offset: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            compression_slot: None,
            timestamp: None,
            hash: [0u8; 20],
            blocks: None,
            flags: 0,
            compression_block_size: 0,
            raw_offset_descriptor: Some(raw_offset_descriptor),
        }
    }
}

//! PAK footer decoder (spec §4.2).

use std::io::{Read, Seek, SeekFrom};

use crate::cursor::PrimitiveRead;
use crate::error::{Error, Result};
use crate::pak::compression::{
    read_compression_name_slot, synthesized_legacy_table, CompressionMethodName,
};
use crate::pak::version::{
    compression_table_len, footer_size, has_encryption_uuid, has_frozen_byte,
    has_index_encrypted_flag, PakVersion,
};

/// PAK footer magic constant (spec §6).
pub const PAK_MAGIC: u32 = 0x5A6F_12E1;

/// Decoded PAK footer.
#[derive(Debug, Clone)]
pub struct PakFooter {
    /// Encryption key GUID, present from [`PakVersion::EncryptionKeyGuid`] onward
    pub encryption_guid: Option<[u8; 16]>,
    /// Whether the index body is encrypted (absent on versions predating the flag)
    pub encrypted_index: bool,
    /// Declared format version
    pub version: PakVersion,
    /// Byte offset of the index within the file
    pub index_offset: u64,
    /// Byte length of the index
    pub index_size: u64,
    /// SHA-1 hash of the index bytes, as declared by the footer
    pub index_hash: [u8; 20],
    /// Frozen-index byte, only present on [`PakVersion::FrozenIndex`]
    pub frozen: Option<bool>,
    /// Compression-method name table (length 0, 4 or 5 depending on version)
    pub compression: Vec<Option<CompressionMethodName>>,
}

impl PakFooter {
    /// Attempt to decode the footer for `candidate`, seeking from the end of
    /// the file. Returns an error the caller (the version probe) can treat as
    /// recoverable if any check fails.
    pub fn read<R: Read + Seek>(
        reader: &mut R,
        candidate: PakVersion,
        file_size: u64,
    ) -> Result<Self> {
        let size = footer_size(candidate);
        if size > file_size {
            return Err(Error::Truncated);
        }
        reader.seek(SeekFrom::Start(file_size - size))?;

        let encryption_guid = if has_encryption_uuid(candidate) {
            Some(reader.read_array::<16>()?)
        } else {
            None
        };

        let encrypted_index = if has_index_encrypted_flag(candidate) {
            match reader.read_u8_le()? {
                0 => false,
                1 => true,
                other => {
                    return Err(Error::invalid_record(format!(
                        "encrypted-index flag must be 0 or 1, got {other}"
                    )))
                }
            }
        } else {
            false
        };

        let magic = reader.read_u32_le()?;
        if magic != PAK_MAGIC {
            return Err(Error::bad_magic(
                PAK_MAGIC.to_le_bytes().to_vec(),
                magic.to_le_bytes().to_vec(),
            ));
        }

        let declared_version = reader.read_u32_le()?;
        if declared_version != candidate.to_num() {
            return Err(Error::UnsupportedVersion(declared_version));
        }

        let index_offset = reader.read_u64_le()?;
        let index_size = reader.read_u64_le()?;
        let index_hash = reader.read_array::<20>()?;

        let frozen = if has_frozen_byte(candidate) {
            Some(reader.read_u8_le()? != 0)
        } else {
            None
        };

        let table_len = compression_table_len(candidate);
        let compression = if table_len > 0 {
            let mut table = Vec::with_capacity(table_len);
            for _ in 0..table_len {
                table.push(read_compression_name_slot(reader)?);
            }
            table
        } else {
            synthesized_legacy_table()
        };

        Ok(PakFooter {
            encryption_guid,
            encrypted_index,
            version: candidate,
            index_offset,
            index_size,
            index_hash,
            frozen,
            compression,
        })
    }
}

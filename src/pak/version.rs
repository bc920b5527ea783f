//! PAK format version and the version-gated field predicates (spec §9 design note:
//! "centralize all version-gated reads behind small predicate functions").

use std::fmt;

/// A PAK format version. Variants are declared oldest to newest so the derived
/// [`Ord`] gives the total ordering the rest of the decoder relies on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PakVersion {
    /// Initial version; entries carry a timestamp
    Initial,
    /// Timestamps dropped from entries
    NoTimestamps,
    /// Compression and encryption support added
    CompressionEncryption,
    /// Index encryption flag added
    IndexEncryption,
    /// Compression block offsets made relative to the entry header
    RelativeChunkOffsets,
    /// Delete records supported
    DeleteRecords,
    /// Encryption key GUID added to the footer
    EncryptionKeyGuid,
    /// UE 4.22-only variant of `FnameBasedCompressionMethod` with 4 compression names
    FnameBasedCompressionMethodInitial,
    /// Compression methods are named, 5 compression names in the footer
    FnameBasedCompressionMethod,
    /// Frozen-index byte present in the footer (UE 4.23 only)
    FrozenIndex,
    /// Index reworked into a path-hash index + full directory index
    PathHashIndex,
    /// FNV64 bug fix
    Fnv64BugFix,
    /// Not a recognized version
    Invalid,
}

/// Candidates tried by the version probe (spec §4.3), newest first. `Fnv64BugFix`
/// and `PathHashIndex` share a footer shape with the versions below them save
/// for the consistency check on the declared version number, and
/// `FnameBasedCompressionMethod`/`FnameBasedCompressionMethodInitial` share the
/// same wire version number (8) but a different compression-table length, so
/// both are tried.
pub const PROBE_ORDER: &[PakVersion] = &[
    PakVersion::Fnv64BugFix,
    PakVersion::PathHashIndex,
    PakVersion::FrozenIndex,
    PakVersion::FnameBasedCompressionMethod,
    PakVersion::FnameBasedCompressionMethodInitial,
    PakVersion::EncryptionKeyGuid,
    PakVersion::DeleteRecords,
    PakVersion::RelativeChunkOffsets,
    PakVersion::IndexEncryption,
    PakVersion::CompressionEncryption,
    PakVersion::NoTimestamps,
    PakVersion::Initial,
];

impl PakVersion {
    /// Convert the wire version number into a [`PakVersion`]. `8` resolves to
    /// `FnameBasedCompressionMethod`; callers that need to consider the 4.22
    /// sub-version try [`PakVersion::FnameBasedCompressionMethodInitial`] as a
    /// separate probe candidate (see [`PROBE_ORDER`]).
    pub fn from_num(version: u32) -> Self {
        match version {
            1 => Self::Initial,
            2 => Self::NoTimestamps,
            3 => Self::CompressionEncryption,
            4 => Self::IndexEncryption,
            5 => Self::RelativeChunkOffsets,
            6 => Self::DeleteRecords,
            7 => Self::EncryptionKeyGuid,
            8 => Self::FnameBasedCompressionMethod,
            9 => Self::FrozenIndex,
            10 => Self::PathHashIndex,
            11 => Self::Fnv64BugFix,
            _ => Self::Invalid,
        }
    }

    /// Convert a [`PakVersion`] to its wire version number.
    pub fn to_num(self) -> u32 {
        match self {
            Self::Initial => 1,
            Self::NoTimestamps => 2,
            Self::CompressionEncryption => 3,
            Self::IndexEncryption => 4,
            Self::RelativeChunkOffsets => 5,
            Self::DeleteRecords => 6,
            Self::EncryptionKeyGuid => 7,
            Self::FnameBasedCompressionMethodInitial => 8,
            Self::FnameBasedCompressionMethod => 8,
            Self::FrozenIndex => 9,
            Self::PathHashIndex => 10,
            Self::Fnv64BugFix => 11,
            Self::Invalid => 0,
        }
    }
}

impl fmt::Display for PakVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} (v{})", self.to_num())
    }
}

/// Whether the footer carries a 128-bit encryption key GUID.
pub fn has_encryption_uuid(v: PakVersion) -> bool {
    v >= PakVersion::EncryptionKeyGuid
}

/// Whether the footer carries an index-encrypted flag byte.
pub fn has_index_encrypted_flag(v: PakVersion) -> bool {
    v >= PakVersion::IndexEncryption
}

/// Whether the footer carries the (always-zero, UE 4.23-only) frozen-index byte.
pub fn has_frozen_byte(v: PakVersion) -> bool {
    v == PakVersion::FrozenIndex
}

/// Whether the footer declares a compression-method name table at all.
pub fn has_compression_table(v: PakVersion) -> bool {
    v >= PakVersion::FnameBasedCompressionMethodInitial
}

/// Number of 32-byte compression-method name slots the footer declares.
pub fn compression_table_len(v: PakVersion) -> usize {
    if v >= PakVersion::FnameBasedCompressionMethod {
        5
    } else if v >= PakVersion::FnameBasedCompressionMethodInitial {
        4
    } else {
        0
    }
}

/// Whether entry records carry a legacy 64-bit timestamp field.
pub fn has_timestamp(v: PakVersion) -> bool {
    v == PakVersion::Initial
}

/// Whether entry records carry compression blocks + flags + block size fields.
pub fn has_compression_block_fields(v: PakVersion) -> bool {
    v >= PakVersion::CompressionEncryption
}

/// Whether the index uses the newer path-hash / full-directory-index split
/// rather than the legacy flat `(path, entry)` list.
pub fn is_path_hash_index(v: PakVersion) -> bool {
    v >= PakVersion::PathHashIndex
}

/// Fixed-size portion of the footer shared by every version (magic, version,
/// index offset, index size, index hash).
pub const FOOTER_BASE_SIZE: u64 = 4 + 4 + 8 + 8 + 20;

/// Size in bytes of the footer for a given version (spec §4.2 formula).
pub fn footer_size(v: PakVersion) -> u64 {
    let mut size = FOOTER_BASE_SIZE;
    if has_encryption_uuid(v) {
        size += 16;
    }
    if has_index_encrypted_flag(v) {
        size += 1;
    }
    if has_frozen_byte(v) {
        size += 1;
    }
    size += (compression_table_len(v) * 32) as u64;
    size
}

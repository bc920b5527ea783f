//! Error type shared by the PAK and IoStore TOC readers

use std::io;
use std::string::{FromUtf16Error, FromUtf8Error};

use thiserror::Error;

/// Error type used by every public operation in this crate
#[derive(Error, Debug)]
pub enum Error {
    /// A magic constant did not match
    #[error("bad magic: expected {expected:?}, got {found:?}")]
    BadMagic {
        /// The magic bytes that were expected
        expected: Vec<u8>,
        /// The magic bytes actually found
        found: Vec<u8>,
    },
    /// The declared format version is outside the set this crate understands,
    /// or the version declared in two places disagreed
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u32),
    /// An encrypted index or container body was encountered; decryption is out of scope.
    /// The encryption key GUID is carried along when it was already read before
    /// the refusal point, so a caller can still arrange a key.
    #[error("container is encrypted, refusing to parse its body")]
    EncryptedContainer {
        /// Encryption key GUID, if it had already been read
        encryption_guid: Option<[u8; 16]>,
    },
    /// A read ran past the end of the buffer or file
    #[error("truncated data")]
    Truncated,
    /// A field failed a structural invariant
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// An `std::io::Error` occurred
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A string was not valid UTF-8
    #[error(transparent)]
    Utf8(#[from] FromUtf8Error),
    /// A string was not valid UTF-16
    #[error(transparent)]
    Utf16(#[from] FromUtf16Error),
}

impl Error {
    /// Build an [`Error::InvalidRecord`] from a formatted message
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Error::InvalidRecord(msg.into())
    }

    /// Build an [`Error::BadMagic`]
    pub fn bad_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Error::BadMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Whether the PAK version probe (spec §4.3) is allowed to swallow this error
    /// and try the next candidate version rather than surfacing it immediately.
    ///
    /// Io errors from a bad seek (file too short) are also treated as recoverable,
    /// since a too-small candidate footer size seeking before the start of the
    /// file is itself evidence the candidate version is wrong.
    pub(crate) fn is_probe_recoverable(&self) -> bool {
        match self {
            Error::BadMagic { .. }
            | Error::UnsupportedVersion(_)
            | Error::Truncated
            | Error::InvalidRecord(_) => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidInput
            ),
            Error::EncryptedContainer { .. } | Error::Utf8(_) | Error::Utf16(_) => false,
        }
    }
}

/// Convenience alias for `Result<T, Error>`
pub type Result<T> = std::result::Result<T, Error>;

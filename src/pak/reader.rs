//! Public PAK reader API (spec §4.3, §4.9, §6).

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::pak::entry::PakEntry;
use crate::pak::footer::PakFooter;
use crate::pak::index::PakIndex;
use crate::pak::version::{PakVersion, FOOTER_BASE_SIZE, PROBE_ORDER};

/// A read-only view over a decoded PAK archive.
#[derive(Debug)]
pub struct PakReader {
    footer: PakFooter,
    mount_point: String,
    entries: Vec<(String, PakEntry)>,
    directories: RefCell<Option<BTreeSet<String>>>,
}

/// Tracks the furthest-progressing failure across probe attempts (spec §9
/// design note: surface the best-progressing failure, not just the last one).
struct ProbeFailure {
    version: PakVersion,
    error: Error,
    rank: u32,
}

fn failure_rank(err: &Error) -> u32 {
    match err {
        Error::BadMagic { .. } => 1,
        Error::UnsupportedVersion(_) => 2,
        Error::Truncated => 0,
        Error::InvalidRecord(_) => 3,
        _ => 4,
    }
}

impl PakReader {
    /// Open and fully decode a PAK file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let file_size = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        Self::open_reader(&mut reader, file_size)
    }

    fn open_reader<R: Read + Seek>(reader: &mut R, file_size: u64) -> Result<Self> {
        if file_size < FOOTER_BASE_SIZE {
            return Err(Error::Truncated);
        }

        let mut best_failure: Option<ProbeFailure> = None;

        for &candidate in PROBE_ORDER {
            trace!("probing PAK version {candidate}");
            match Self::try_version(reader, candidate, file_size) {
                Ok(reader_state) => {
                    debug!("PAK opened as {candidate}");
                    return Ok(reader_state);
                }
                Err(err) => {
                    if !err.is_probe_recoverable() {
                        warn!("PAK probe aborted on non-recoverable error: {err}");
                        return Err(err);
                    }
                    let rank = failure_rank(&err);
                    let replace = match &best_failure {
                        Some(existing) => rank >= existing.rank,
                        None => true,
                    };
                    if replace {
                        best_failure = Some(ProbeFailure { version: candidate, error: err, rank });
                    }
                }
            }
        }

        match best_failure {
            Some(failure) => {
                warn!(
                    "no PAK version matched; furthest attempt was {} ({})",
                    failure.version, failure.error
                );
                Err(failure.error)
            }
            None => Err(Error::invalid_record("no PAK version candidates available")),
        }
    }

    fn try_version<R: Read + Seek>(
        reader: &mut R,
        candidate: PakVersion,
        file_size: u64,
    ) -> Result<Self> {
        let footer = PakFooter::read(reader, candidate, file_size)?;

        if footer.encrypted_index {
            return Err(Error::EncryptedContainer { encryption_guid: footer.encryption_guid });
        }

        if footer.index_size > file_size {
            return Err(Error::Truncated);
        }

        reader.seek(SeekFrom::Start(footer.index_offset))?;
        let index = PakIndex::read(reader, candidate, footer.compression.len())?;

        Ok(PakReader {
            mount_point: index.mount_point,
            entries: index.entries,
            footer,
            directories: RefCell::new(None),
        })
    }

    /// The decoded format version.
    pub fn version(&self) -> PakVersion {
        self.footer.version
    }

    /// The archive's mount point.
    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    /// Whether the index body is marked encrypted.
    ///
    /// [`open`] fails with [`Error::EncryptedContainer`] before ever
    /// returning a reader for an encrypted index, so this is always `false`
    /// on a successfully opened one.
    ///
    /// [`open`]: PakReader::open
    pub fn encrypted_index(&self) -> bool {
        self.footer.encrypted_index
    }

    /// The footer's encryption key GUID, if the version carries one.
    pub fn encryption_guid(&self) -> Option<[u8; 16]> {
        self.footer.encryption_guid
    }

    /// All file paths as stored (mount point not concatenated), in
    /// insertion order.
    pub fn files(&self) -> Vec<&str> {
        self.entries.iter().map(|(path, _)| path.as_str()).collect()
    }

    /// Look up the decoded entry for a stored path.
    pub fn entry(&self, path: &str) -> Option<&PakEntry> {
        self.entries.iter().find(|(p, _)| p == path).map(|(_, e)| e)
    }

    /// Sorted list of unique proper ancestor directories of every file path.
    pub fn directories(&self) -> Vec<String> {
        let mut cache = self.directories.borrow_mut();
        if cache.is_none() {
            let mut set = BTreeSet::new();
            for (path, _) in &self.entries {
                let mut components: Vec<&str> = path.split('/').collect();
                components.pop();
                let mut prefix = String::new();
                for component in components {
                    if !prefix.is_empty() {
                        prefix.push('/');
                    }
                    prefix.push_str(component);
                    set.insert(prefix.clone());
                }
            }
            *cache = Some(set);
        }
        cache.as_ref().unwrap().iter().cloned().collect()
    }
}

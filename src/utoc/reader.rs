//! Public UTOC reader API (spec §4.9, §6).

use std::cell::RefCell;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::utoc::body::TocBody;
use crate::utoc::directory::DirectoryIndex;
use crate::utoc::header::{TocHeader, TOC_HEADER_SIZE};

/// A read-only view over a decoded IoStore table-of-contents file.
#[derive(Debug)]
pub struct TocReader {
    header: TocHeader,
    body: TocBody,
    file_paths: RefCell<Option<Vec<String>>>,
}

impl TocReader {
    /// Open and fully decode a `.utoc` file at `path`.
    ///
    /// Per spec, the whole file is read into memory up front and the file
    /// handle is released before this returns.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Self::from_bytes(&buf)
    }

    /// Decode a UTOC file already resident in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if (bytes.len() as u64) < TOC_HEADER_SIZE as u64 {
            return Err(Error::Truncated);
        }
        let mut cursor = Cursor::new(bytes);
        let header = TocHeader::read(&mut cursor)?;
        let body = TocBody::read(&mut cursor, &header)?;
        debug!("UTOC opened as {} ({} entries)", header.version, header.toc_entry_count);
        Ok(TocReader { header, body, file_paths: RefCell::new(None) })
    }

    /// The decoded fixed header.
    pub fn header(&self) -> &TocHeader {
        &self.header
    }

    /// All decoded body sections.
    pub fn body(&self) -> &TocBody {
        &self.body
    }

    /// The directory index. Empty (no entries) if the container is
    /// unindexed or carries no directory index section.
    pub fn directory_index(&self) -> &DirectoryIndex {
        &self.body.directory_index
    }

    /// Every file's full path, mount point concatenated and slash-normalized.
    /// Empty if the container carries no directory index. Computed lazily
    /// and cached on first call.
    pub fn all_file_paths(&self) -> Result<Vec<String>> {
        if let Some(cached) = self.file_paths.borrow().as_ref() {
            return Ok(cached.clone());
        }
        let paths = self.body.directory_index.all_file_paths()?;
        *self.file_paths.borrow_mut() = Some(paths.clone());
        Ok(paths)
    }
}

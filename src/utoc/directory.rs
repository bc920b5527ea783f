//! UTOC directory-index decoder (spec §4.8): tree of directories + linked
//! lists of files over a shared string table.

use std::io::Read;

use crate::cursor::PrimitiveRead;
use crate::error::{Error, Result};

/// One directory-tree node. Indices are `None` when absent (sentinel
/// `0xFFFFFFFF`, normalized by [`crate::cursor::PrimitiveRead::read_optional_index`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// String-table index of this directory's name; `None` for the root
    pub name: Option<u32>,
    /// Index of the first child directory
    pub first_child_entry: Option<u32>,
    /// Index of the next sibling directory
    pub next_sibling_entry: Option<u32>,
    /// Index of the first file in this directory
    pub first_file_entry: Option<u32>,
}

/// One file node in a directory's singly linked file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry {
    /// String-table index of this file's name
    pub name: u32,
    /// Index of the next file in the same directory
    pub next_file_entry: Option<u32>,
    /// Chunk index this file refers to
    pub user_data: u32,
}

/// The decoded directory index.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    /// Mount-point string
    pub mount_point: String,
    /// Directory nodes; entry 0 is the root
    pub directory_entries: Vec<DirectoryEntry>,
    /// File nodes
    pub file_entries: Vec<FileEntry>,
    /// Shared string table
    pub string_table: Vec<String>,
}

impl DirectoryIndex {
    /// An empty directory index, used when a container carries no directory
    /// index section (unindexed, or an empty one) but the public API still
    /// needs a `DirectoryIndex` to hand back (spec §6: non-optional return).
    pub fn empty() -> Self {
        DirectoryIndex {
            mount_point: String::new(),
            directory_entries: Vec::new(),
            file_entries: Vec::new(),
            string_table: Vec::new(),
        }
    }

    /// Decode a directory index from its raw sub-buffer (spec §4.7 step 7).
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mount_point = reader.read_engine_string()?;

        let directory_count = reader.read_u32_le()?;
        let mut directory_entries = Vec::with_capacity(directory_count as usize);
        for _ in 0..directory_count {
            directory_entries.push(DirectoryEntry {
                name: reader.read_optional_index()?,
                first_child_entry: reader.read_optional_index()?,
                next_sibling_entry: reader.read_optional_index()?,
                first_file_entry: reader.read_optional_index()?,
            });
        }

        let file_count = reader.read_u32_le()?;
        let mut file_entries = Vec::with_capacity(file_count as usize);
        for _ in 0..file_count {
            let name = reader.read_u32_le()?;
            let next_file_entry = reader.read_optional_index()?;
            let user_data = reader.read_u32_le()?;
            file_entries.push(FileEntry { name, next_file_entry, user_data });
        }

        let string_count = reader.read_u32_le()?;
        let mut string_table = Vec::with_capacity(string_count as usize);
        for _ in 0..string_count {
            string_table.push(reader.read_engine_string()?);
        }

        let index = DirectoryIndex { mount_point, directory_entries, file_entries, string_table };
        index.validate()?;
        Ok(index)
    }

    fn string(&self, index: u32) -> Result<&str> {
        self.string_table
            .get(index as usize)
            .map(|s| s.as_str())
            .ok_or_else(|| Error::invalid_record(format!("string index {index} out of range")))
    }

    fn validate(&self) -> Result<()> {
        for entry in &self.directory_entries {
            for idx in [entry.first_child_entry, entry.next_sibling_entry] {
                if let Some(i) = idx {
                    if i as usize >= self.directory_entries.len() {
                        return Err(Error::invalid_record(format!(
                            "directory index {i} out of range"
                        )));
                    }
                }
            }
            if let Some(i) = entry.first_file_entry {
                if i as usize >= self.file_entries.len() {
                    return Err(Error::invalid_record(format!("file index {i} out of range")));
                }
            }
        }
        for entry in &self.file_entries {
            if entry.name as usize >= self.string_table.len() {
                return Err(Error::invalid_record(format!(
                    "file name index {} out of range",
                    entry.name
                )));
            }
            if let Some(i) = entry.next_file_entry {
                if i as usize >= self.file_entries.len() {
                    return Err(Error::invalid_record(format!("file index {i} out of range")));
                }
            }
        }
        Ok(())
    }

    /// Depth-first traversal from the root, yielding every file's full path
    /// (mount point + directory path + file name, slashes collapsed).
    pub fn all_file_paths(&self) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        if !self.directory_entries.is_empty() {
            let mut visited = vec![false; self.directory_entries.len()];
            let mut stack = Vec::new();
            self.walk(0, &mut stack, &mut visited, &mut paths)?;
        }
        Ok(paths)
    }

    fn walk(
        &self,
        dir_index: u32,
        stack: &mut Vec<String>,
        visited: &mut [bool],
        paths: &mut Vec<String>,
    ) -> Result<()> {
        if visited[dir_index as usize] {
            return Err(Error::invalid_record("directory cycle detected"));
        }
        visited[dir_index as usize] = true;

        let entry = &self.directory_entries[dir_index as usize];
        let pushed = if let Some(name_idx) = entry.name {
            stack.push(self.string(name_idx)?.to_string());
            true
        } else {
            false
        };

        let mut file_idx = entry.first_file_entry;
        while let Some(fi) = file_idx {
            let file = &self.file_entries[fi as usize];
            let name = self.string(file.name)?;
            let dir_path = stack.join("/");
            let mut full = format!("{}/{}/{}", self.mount_point, dir_path, name);
            collapse_slashes(&mut full);
            paths.push(full);
            file_idx = file.next_file_entry;
        }

        let mut child = entry.first_child_entry;
        while let Some(ci) = child {
            self.walk(ci, stack, visited, paths)?;
            child = self.directory_entries[ci as usize].next_sibling_entry;
        }

        if pushed {
            stack.pop();
        }
        Ok(())
    }
}

fn collapse_slashes(path: &mut String) {
    let collapsed: String = path.chars().fold(String::with_capacity(path.len()), |mut acc, c| {
        if c == '/' && acc.ends_with('/') {
            acc
        } else {
            acc.push(c);
            acc
        }
    });
    *path = collapsed;
}

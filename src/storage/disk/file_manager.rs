use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::debug;
use parking_lot::Mutex;

use crate::common::types::{BlockNum, TEMP_FILE_PREFIX};
use crate::storage::disk::{BlockId, FileError};
use crate::storage::page::Page;

/// FileManager owns all raw disk I/O of a database directory.
///
/// Each file gets its own handle behind its own mutex, so operations on one
/// file are serialized while different files proceed concurrently.
pub struct FileManager {
    db_directory: PathBuf,
    block_size: usize,
    is_new: bool,
    sync_writes: bool,
    open_files: Mutex<HashMap<String, Arc<Mutex<File>>>>,
}

impl FileManager {
    /// Open (or create) the database directory, syncing every write
    pub fn new(db_directory: impl AsRef<Path>, block_size: usize) -> Result<Self, FileError> {
        Self::with_sync(db_directory, block_size, true)
    }

    /// Open (or create) the database directory.
    ///
    /// Leftover temporary files from a previous run are deleted.
    pub fn with_sync(
        db_directory: impl AsRef<Path>,
        block_size: usize,
        sync_writes: bool,
    ) -> Result<Self, FileError> {
        let db_directory = db_directory.as_ref().to_path_buf();
        let dir_err = |source| FileError::Directory { path: db_directory.clone(), source };

        let is_new = !db_directory.exists();
        if is_new {
            fs::create_dir_all(&db_directory).map_err(dir_err)?;
        }

        for entry in fs::read_dir(&db_directory).map_err(dir_err)? {
            let entry = entry.map_err(dir_err)?;
            if entry.file_name().to_string_lossy().starts_with(TEMP_FILE_PREFIX) {
                debug!("Removing leftover temporary file {:?}", entry.path());
                fs::remove_file(entry.path()).map_err(dir_err)?;
            }
        }

        Ok(Self {
            db_directory,
            block_size,
            is_new,
            sync_writes,
            open_files: Mutex::new(HashMap::new()),
        })
    }

    /// Read the contents of a block into a page.
    ///
    /// Bytes beyond the current end of the file read as zeros.
    pub fn read(&self, block: &BlockId, page: &mut Page) -> Result<(), FileError> {
        let offset = self.offset_of(block)?;
        let read_err = |source| FileError::Read { block: block.clone(), source };

        let handle = self.file(block.file_name())?;
        let mut file = handle.lock();
        file.seek(SeekFrom::Start(offset)).map_err(read_err)?;

        let buffer = page.contents_mut();
        let mut filled = 0;
        while filled < buffer.len() {
            match file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => return Err(read_err(source)),
            }
        }
        buffer[filled..].fill(0);

        Ok(())
    }

    /// Write the contents of a page into a block
    pub fn write(&self, block: &BlockId, page: &Page) -> Result<(), FileError> {
        let offset = self.offset_of(block)?;
        let write_err = |source| FileError::Write { block: block.clone(), source };

        let handle = self.file(block.file_name())?;
        let mut file = handle.lock();
        file.seek(SeekFrom::Start(offset)).map_err(write_err)?;
        file.write_all(page.contents()).map_err(write_err)?;
        if self.sync_writes {
            file.sync_data().map_err(write_err)?;
        }

        Ok(())
    }

    /// Extend a file by one zeroed block and return its id
    pub fn append(&self, file_name: &str) -> Result<BlockId, FileError> {
        let append_err = |source| FileError::Append { file_name: file_name.to_string(), source };

        let handle = self.file(file_name)?;
        let mut file = handle.lock();

        let length = file.metadata().map_err(append_err)?.len() / self.block_size as u64;
        let block = BlockId::new(file_name, length);

        file.seek(SeekFrom::Start(length * self.block_size as u64)).map_err(append_err)?;
        file.write_all(&vec![0u8; self.block_size]).map_err(append_err)?;
        if self.sync_writes {
            file.sync_data().map_err(append_err)?;
        }

        Ok(block)
    }

    /// Number of blocks in a file
    pub fn length(&self, file_name: &str) -> Result<BlockNum, FileError> {
        let handle = self.file(file_name)?;
        let file = handle.lock();
        let bytes = file
            .metadata()
            .map_err(|source| FileError::Access { file_name: file_name.to_string(), source })?
            .len();
        Ok(bytes / self.block_size as u64)
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Whether the database directory was created by this file manager
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn db_directory(&self) -> &Path {
        &self.db_directory
    }

    fn offset_of(&self, block: &BlockId) -> Result<u64, FileError> {
        if block.is_end_of_file() {
            return Err(FileError::InvalidBlock(block.clone()));
        }
        block
            .number()
            .checked_mul(self.block_size as u64)
            .ok_or_else(|| FileError::InvalidBlock(block.clone()))
    }

    /// Get the handle for a file, opening (and creating) it on first use
    fn file(&self, file_name: &str) -> Result<Arc<Mutex<File>>, FileError> {
        let mut open_files = self.open_files.lock();
        if let Some(handle) = open_files.get(file_name) {
            return Ok(Arc::clone(handle));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.db_directory.join(file_name))
            .map_err(|source| FileError::Access { file_name: file_name.to_string(), source })?;

        let handle = Arc::new(Mutex::new(file));
        open_files.insert(file_name.to_string(), Arc::clone(&handle));
        Ok(handle)
    }
}

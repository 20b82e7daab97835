use std::sync::Arc;
use log::debug;
use parking_lot::Mutex;
use thiserror::Error;

use crate::common::types::{Lsn, INT_SIZE};
use crate::storage::disk::{BlockId, FileError, FileManager};
use crate::storage::page::{Page, PageError};
use crate::transaction::wal::log_iterator::LogIterator;

/// Error type for log manager operations
#[derive(Error, Debug)]
pub enum LogError {
    #[error("log file error: {0}")]
    FileError(#[from] FileError),

    #[error("log page error: {0}")]
    PageError(#[from] PageError),

    #[error("log record of {size} bytes does not fit in a {block_size}-byte log block")]
    RecordTooLarge { size: usize, block_size: usize },

    #[error("log block {block} has an invalid boundary {boundary}")]
    CorruptBlock { block: BlockId, boundary: i32 },
}

/// Result type for log manager operations
pub type Result<T> = std::result::Result<T, LogError>;

/// The tail of the log, guarded by the log manager's mutex
struct LogTail {
    page: Page,
    current_block: BlockId,
    latest_lsn: Lsn,
    last_saved_lsn: Lsn,
}

/// Manager for the write-ahead log file.
///
/// Records are written right to left inside each block. The first four
/// bytes of a block hold the boundary, the offset of the most recently
/// written record, and each record is stored as its length followed by its
/// bytes. Reading forward from the boundary therefore visits records newest
/// first, which is the order undo needs.
pub struct LogManager {
    file_manager: Arc<FileManager>,
    log_file: String,
    tail: Mutex<LogTail>,
}

impl LogManager {
    /// Open the log file, creating its first block if the file is empty
    pub fn new(file_manager: Arc<FileManager>, log_file: impl Into<String>) -> Result<Self> {
        let log_file = log_file.into();
        let mut page = Page::new(file_manager.block_size());

        let log_size = file_manager.length(&log_file)?;
        let current_block = if log_size == 0 {
            Self::append_new_block(&file_manager, &log_file, &mut page)?
        } else {
            let block = BlockId::new(log_file.as_str(), log_size - 1);
            file_manager.read(&block, &mut page)?;
            block
        };

        Ok(Self {
            file_manager,
            log_file,
            tail: Mutex::new(LogTail {
                page,
                current_block,
                latest_lsn: 0,
                last_saved_lsn: 0,
            }),
        })
    }

    /// Append a record to the log and return its LSN.
    ///
    /// When the current block has no room left it is written out and a
    /// fresh block is started.
    pub fn append(&self, record: &[u8]) -> Result<Lsn> {
        let block_size = self.file_manager.block_size();
        let bytes_needed = Page::max_length(record.len());
        if bytes_needed + INT_SIZE > block_size {
            return Err(LogError::RecordTooLarge { size: record.len(), block_size });
        }

        let mut tail = self.tail.lock();
        let mut boundary = Self::boundary(&tail)?;

        if boundary < bytes_needed + INT_SIZE {
            self.write_tail(&mut tail)?;
            let block = Self::append_new_block(&self.file_manager, &self.log_file, &mut tail.page)?;
            tail.current_block = block;
            debug!("Log rolled over to {}", tail.current_block);
            boundary = block_size;
        }

        let record_pos = boundary - bytes_needed;
        tail.page.set_bytes(record_pos, record)?;
        tail.page.set_int(0, record_pos as i32)?;
        tail.latest_lsn += 1;

        Ok(tail.latest_lsn)
    }

    /// Ensure the record with the given LSN, and every earlier one, is on disk
    pub fn flush(&self, lsn: Lsn) -> Result<()> {
        let mut tail = self.tail.lock();
        if lsn >= tail.last_saved_lsn {
            self.write_tail(&mut tail)?;
        }
        Ok(())
    }

    /// Flush the log and iterate over its records, newest first
    pub fn iterator(&self) -> Result<LogIterator> {
        let current_block = {
            let mut tail = self.tail.lock();
            self.write_tail(&mut tail)?;
            tail.current_block.clone()
        };
        LogIterator::new(Arc::clone(&self.file_manager), current_block)
    }

    /// LSN of the most recently appended record (0 if none since open)
    pub fn latest_lsn(&self) -> Lsn {
        self.tail.lock().latest_lsn
    }

    /// Highest LSN known to be on disk
    pub fn last_saved_lsn(&self) -> Lsn {
        self.tail.lock().last_saved_lsn
    }

    /// The log block currently being filled
    pub fn current_block(&self) -> BlockId {
        self.tail.lock().current_block.clone()
    }

    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    fn boundary(tail: &LogTail) -> Result<usize> {
        let boundary = tail.page.get_int(0)?;
        if boundary < INT_SIZE as i32 || boundary as usize > tail.page.len() {
            return Err(LogError::CorruptBlock { block: tail.current_block.clone(), boundary });
        }
        Ok(boundary as usize)
    }

    fn write_tail(&self, tail: &mut LogTail) -> Result<()> {
        self.file_manager.write(&tail.current_block, &tail.page)?;
        tail.last_saved_lsn = tail.latest_lsn;
        Ok(())
    }

    /// Clear the page, mark it empty and write it as a new block of the log
    fn append_new_block(file_manager: &FileManager, log_file: &str, page: &mut Page) -> Result<BlockId> {
        let block = file_manager.append(log_file)?;
        page.contents_mut().fill(0);
        page.set_int(0, file_manager.block_size() as i32)?;
        file_manager.write(&block, page)?;
        Ok(block)
    }
}

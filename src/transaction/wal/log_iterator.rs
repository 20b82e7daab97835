use std::sync::Arc;

use crate::common::types::INT_SIZE;
use crate::storage::disk::{BlockId, FileManager};
use crate::storage::page::Page;
use crate::transaction::wal::log_manager::{LogError, Result};

/// Iterator over the log records, from the most recent to the earliest.
///
/// Each block is read from its boundary forward; when a block is exhausted
/// the iterator moves to the preceding block. A read error ends the
/// iteration after it has been yielded.
pub struct LogIterator {
    file_manager: Arc<FileManager>,
    block: BlockId,
    page: Page,
    current_pos: usize,
    failed: bool,
}

impl LogIterator {
    /// Create an iterator positioned at the newest record of `block`
    pub fn new(file_manager: Arc<FileManager>, block: BlockId) -> Result<Self> {
        let page = Page::new(file_manager.block_size());
        let mut iterator = Self {
            file_manager,
            block: block.clone(),
            page,
            current_pos: 0,
            failed: false,
        };
        iterator.move_to_block(block)?;
        Ok(iterator)
    }

    fn block_size(&self) -> usize {
        self.file_manager.block_size()
    }

    /// Read `block` and position at its boundary
    fn move_to_block(&mut self, block: BlockId) -> Result<()> {
        self.file_manager.read(&block, &mut self.page)?;
        let boundary = self.page.get_int(0)?;
        if boundary < INT_SIZE as i32 || boundary as usize > self.block_size() {
            return Err(LogError::CorruptBlock { block, boundary });
        }
        self.current_pos = boundary as usize;
        self.block = block;
        Ok(())
    }
}

impl Iterator for LogIterator {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if self.current_pos < self.block_size() {
                let record = match self.page.get_bytes(self.current_pos) {
                    Ok(bytes) => bytes.to_vec(),
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(e.into()));
                    }
                };
                self.current_pos += INT_SIZE + record.len();
                return Some(Ok(record));
            }
            if self.block.number() == 0 {
                return None;
            }
            let previous = BlockId::new(self.block.file_name(), self.block.number() - 1);
            if let Err(e) = self.move_to_block(previous) {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

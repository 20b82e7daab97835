use std::sync::Arc;
use parking_lot::RwLock;

use crate::common::types::{Lsn, PagePtr, TxnId};
use crate::storage::buffer::BufferPoolError;
use crate::storage::disk::{BlockId, FileManager};
use crate::storage::page::Page;
use crate::transaction::wal::LogManager;

/// One page-sized buffer of the pool.
///
/// Besides the page it tracks the block it holds, how many times it is
/// pinned and, when dirty, the transaction that modified it and the LSN of
/// that transaction's latest log record. Every field is mutated only by the
/// buffer pool while it holds its lock.
pub struct Buffer {
    file_manager: Arc<FileManager>,
    log_manager: Arc<LogManager>,
    contents: PagePtr,
    block: Option<BlockId>,
    pins: u32,
    modified_by: Option<TxnId>,
    lsn: Option<Lsn>,
}

impl Buffer {
    pub(crate) fn new(file_manager: Arc<FileManager>, log_manager: Arc<LogManager>) -> Self {
        let contents = Arc::new(RwLock::new(Page::new(file_manager.block_size())));
        Self {
            file_manager,
            log_manager,
            contents,
            block: None,
            pins: 0,
            modified_by: None,
            lsn: None,
        }
    }

    pub fn contents(&self) -> &PagePtr {
        &self.contents
    }

    pub fn block(&self) -> Option<&BlockId> {
        self.block.as_ref()
    }

    pub fn is_pinned(&self) -> bool {
        self.pins > 0
    }

    pub fn modifying_txn(&self) -> Option<TxnId> {
        self.modified_by
    }

    /// Mark the buffer dirty. An unlogged change (`lsn == None`) keeps the
    /// LSN of the previous logged change.
    pub(crate) fn set_modified(&mut self, txnum: TxnId, lsn: Option<Lsn>) {
        self.modified_by = Some(txnum);
        if lsn.is_some() {
            self.lsn = lsn;
        }
    }

    /// Read `block` into this buffer, writing out the previous contents
    /// first if they are dirty
    pub(crate) fn assign_to_block(&mut self, block: BlockId) -> Result<(), BufferPoolError> {
        self.flush()?;
        self.block = None;
        self.file_manager.read(&block, &mut self.contents.write())?;
        self.block = Some(block);
        self.pins = 0;
        Ok(())
    }

    /// Write the page to its block if it is dirty. The log is flushed up to
    /// the buffer's LSN before the page is written.
    pub(crate) fn flush(&mut self) -> Result<(), BufferPoolError> {
        if self.modified_by.is_none() {
            return Ok(());
        }
        if let Some(lsn) = self.lsn {
            self.log_manager.flush(lsn)?;
        }
        if let Some(block) = &self.block {
            self.file_manager.write(block, &self.contents.read())?;
        }
        self.modified_by = None;
        Ok(())
    }

    pub(crate) fn pin(&mut self) {
        self.pins += 1;
    }

    pub(crate) fn unpin(&mut self) {
        self.pins -= 1;
    }
}

// Kura Transaction implementation
// Ties locking, logging and buffer pinning together for one unit of work

use std::sync::Arc;
use log::{debug, warn};
use thiserror::Error;

use crate::common::types::{BlockNum, BufferId, TxnId};
use crate::storage::buffer::{BufferPoolError, BufferPoolManager};
use crate::storage::disk::{BlockId, FileError, FileManager};
use crate::storage::page::PageError;
use crate::transaction::concurrency::buffer_list::BufferList;
use crate::transaction::concurrency::concurrency_manager::ConcurrencyManager;
use crate::transaction::concurrency::lock_table::{LockError, LockTable};
use crate::transaction::recovery::RecoveryManager;
use crate::transaction::wal::{LogError, LogManager, LogRecordError};

/// Transaction states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    RolledBack,
}

/// Errors that can occur during transaction processing
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Transaction {txnum} is {state:?}")]
    InvalidState { txnum: TxnId, state: TransactionState },

    #[error("{0} is not pinned by this transaction")]
    BlockNotPinned(BlockId),

    #[error("Buffer pool error: {0}")]
    BufferPoolError(#[from] BufferPoolError),

    #[error("Lock error: {0}")]
    LockError(#[from] LockError),

    #[error("Log error: {0}")]
    LogError(#[from] LogError),

    #[error("Log record error: {0}")]
    LogRecordError(#[from] LogRecordError),

    #[error("Page error: {0}")]
    PageError(#[from] PageError),

    #[error("Disk error: {0}")]
    FileError(#[from] FileError),
}

impl TransactionError {
    /// Whether the error came from a bounded wait running out. The caller
    /// is expected to roll back and may retry the whole transaction.
    pub fn is_abort_signal(&self) -> bool {
        matches!(
            self,
            TransactionError::BufferPoolError(BufferPoolError::BufferTimeout { .. })
                | TransactionError::LockError(LockError::LockTimeout { .. })
        )
    }
}

/// Result type for transaction operations
pub type Result<T> = std::result::Result<T, TransactionError>;

/// A transaction over the shared file, log, buffer and lock services.
///
/// Reads take shared block locks and writes take exclusive ones, all held
/// until the transaction commits or rolls back. A transaction dropped
/// while still active is rolled back.
pub struct Transaction {
    txnum: TxnId,
    state: TransactionState,
    recovery: RecoveryManager,
    concurrency: ConcurrencyManager,
    buffers: BufferList,
    file_manager: Arc<FileManager>,
    buffer_pool: Arc<BufferPoolManager>,
}

impl Transaction {
    pub fn new(
        txnum: TxnId,
        file_manager: Arc<FileManager>,
        log_manager: Arc<LogManager>,
        buffer_pool: Arc<BufferPoolManager>,
        lock_table: Arc<LockTable>,
    ) -> Result<Self> {
        let recovery = RecoveryManager::new(txnum, log_manager, buffer_pool.clone())?;
        debug!("transaction {} started", txnum);

        Ok(Self {
            txnum,
            state: TransactionState::Active,
            recovery,
            concurrency: ConcurrencyManager::new(lock_table),
            buffers: BufferList::new(buffer_pool.clone()),
            file_manager,
            buffer_pool,
        })
    }

    pub fn txnum(&self) -> TxnId {
        self.txnum
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Make the transaction's changes durable and release its locks and pins
    pub fn commit(&mut self) -> Result<()> {
        self.check_active()?;
        self.recovery.commit()?;
        self.finish(TransactionState::Committed)?;
        debug!("transaction {} committed", self.txnum);
        Ok(())
    }

    /// Undo the transaction's changes and release its locks and pins
    pub fn rollback(&mut self) -> Result<()> {
        self.check_active()?;
        let recovery = self.recovery.clone();
        recovery.rollback(self)?;
        self.finish(TransactionState::RolledBack)?;
        debug!("transaction {} rolled back", self.txnum);
        Ok(())
    }

    /// Restore the database to a consistent state after a restart
    pub fn recover(&mut self) -> Result<()> {
        self.check_active()?;
        self.buffer_pool.flush_all(self.txnum)?;
        let recovery = self.recovery.clone();
        recovery.recover(self)
    }

    pub fn pin(&mut self, block: &BlockId) -> Result<()> {
        self.check_active()?;
        self.buffers.pin(block)?;
        Ok(())
    }

    pub fn unpin(&mut self, block: &BlockId) -> Result<()> {
        self.check_active()?;
        self.buffers.unpin(block)
    }

    pub fn get_int(&mut self, block: &BlockId, offset: usize) -> Result<i32> {
        self.check_active()?;
        self.concurrency.s_lock(block)?;
        let contents = self.buffer_pool.contents(self.pinned_buffer(block)?)?;
        let value = contents.read().get_int(offset)?;
        Ok(value)
    }

    pub fn get_string(&mut self, block: &BlockId, offset: usize) -> Result<String> {
        self.check_active()?;
        self.concurrency.s_lock(block)?;
        let contents = self.buffer_pool.contents(self.pinned_buffer(block)?)?;
        let value = contents.read().get_string(offset)?;
        Ok(value)
    }

    /// Write an integer into a pinned block. With `ok_to_log` the value it
    /// replaces is logged first so the change can be undone.
    pub fn set_int(&mut self, block: &BlockId, offset: usize, value: i32, ok_to_log: bool) -> Result<()> {
        self.check_active()?;
        self.concurrency.x_lock(block)?;
        let id = self.pinned_buffer(block)?;
        let contents = self.buffer_pool.contents(id)?;

        let lsn = if ok_to_log {
            let page = contents.read();
            Some(self.recovery.set_int(&page, block, offset)?)
        } else {
            None
        };
        contents.write().set_int(offset, value)?;
        self.buffer_pool.set_modified(id, self.txnum, lsn)?;
        Ok(())
    }

    /// Write a string into a pinned block, logging the old one when
    /// `ok_to_log` is set.
    ///
    /// When logging, the target slot must already hold a length-prefixed
    /// string (zeroed bytes read as the empty string); otherwise the old
    /// value cannot be decoded and nothing is written.
    pub fn set_string(&mut self, block: &BlockId, offset: usize, value: &str, ok_to_log: bool) -> Result<()> {
        self.check_active()?;
        self.concurrency.x_lock(block)?;
        let id = self.pinned_buffer(block)?;
        let contents = self.buffer_pool.contents(id)?;

        let lsn = if ok_to_log {
            let page = contents.read();
            Some(self.recovery.set_string(&page, block, offset)?)
        } else {
            None
        };
        contents.write().set_string(offset, value)?;
        self.buffer_pool.set_modified(id, self.txnum, lsn)?;
        Ok(())
    }

    /// Number of blocks in `file_name`, under a shared lock on its end
    pub fn size(&mut self, file_name: &str) -> Result<BlockNum> {
        self.check_active()?;
        self.concurrency.s_lock(&BlockId::end_of_file(file_name))?;
        Ok(self.file_manager.length(file_name)?)
    }

    /// Append a zeroed block to `file_name`, under an exclusive lock on its end
    pub fn append(&mut self, file_name: &str) -> Result<BlockId> {
        self.check_active()?;
        self.concurrency.x_lock(&BlockId::end_of_file(file_name))?;
        Ok(self.file_manager.append(file_name)?)
    }

    pub fn block_size(&self) -> usize {
        self.file_manager.block_size()
    }

    pub fn available_buffers(&self) -> usize {
        self.buffer_pool.available()
    }

    fn pinned_buffer(&self, block: &BlockId) -> Result<BufferId> {
        self.buffers
            .buffer(block)
            .ok_or_else(|| TransactionError::BlockNotPinned(block.clone()))
    }

    fn check_active(&self) -> Result<()> {
        match self.state {
            TransactionState::Active => Ok(()),
            state => Err(TransactionError::InvalidState { txnum: self.txnum, state }),
        }
    }

    fn finish(&mut self, state: TransactionState) -> Result<()> {
        self.state = state;
        self.concurrency.release();
        self.buffers.unpin_all()
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.state == TransactionState::Active {
            warn!("transaction {} dropped while active, rolling back", self.txnum);
            if let Err(e) = self.rollback() {
                warn!("rollback of transaction {} failed: {}", self.txnum, e);
                self.concurrency.release();
                if let Err(e) = self.buffers.unpin_all() {
                    warn!("unpinning buffers of transaction {} failed: {}", self.txnum, e);
                }
            }
        }
    }
}

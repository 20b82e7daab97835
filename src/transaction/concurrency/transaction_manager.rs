use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::common::types::TxnId;
use crate::storage::buffer::BufferPoolManager;
use crate::storage::disk::FileManager;
use crate::transaction::concurrency::lock_table::LockTable;
use crate::transaction::concurrency::transaction::{Result, Transaction};
use crate::transaction::wal::LogManager;

/// Transaction manager - hands out transaction numbers and builds
/// transactions over the shared services of one database
pub struct TransactionManager {
    /// Next transaction number to assign
    next_txn_id: AtomicU32,
    file_manager: Arc<FileManager>,
    log_manager: Arc<LogManager>,
    buffer_pool: Arc<BufferPoolManager>,
    lock_table: Arc<LockTable>,
}

impl TransactionManager {
    pub fn new(
        file_manager: Arc<FileManager>,
        log_manager: Arc<LogManager>,
        buffer_pool: Arc<BufferPoolManager>,
        lock_table: Arc<LockTable>,
    ) -> Self {
        Self {
            next_txn_id: AtomicU32::new(1),
            file_manager,
            log_manager,
            buffer_pool,
            lock_table,
        }
    }

    /// Begin a new transaction
    pub fn begin(&self) -> Result<Transaction> {
        let txnum = self.next_txn_id.fetch_add(1, Ordering::SeqCst);
        Transaction::new(
            txnum,
            self.file_manager.clone(),
            self.log_manager.clone(),
            self.buffer_pool.clone(),
            self.lock_table.clone(),
        )
    }

    /// Number the next transaction will receive
    pub fn next_txnum(&self) -> TxnId {
        self.next_txn_id.load(Ordering::SeqCst)
    }
}

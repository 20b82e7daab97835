// Kura Transaction Recovery Module
//
// Undo-only recovery: every update record stores the value it replaced, and
// committed changes are forced to disk before the commit record, so
// recovery never needs to redo anything.

use std::collections::HashSet;
use std::sync::Arc;
use log::{debug, info};

use crate::common::types::{Lsn, TxnId};
use crate::storage::buffer::BufferPoolManager;
use crate::storage::disk::BlockId;
use crate::storage::page::Page;
use crate::transaction::concurrency::transaction::{Result, Transaction};
use crate::transaction::wal::{LogManager, LogRecord};

/// Recovery manager of a single transaction
#[derive(Clone)]
pub struct RecoveryManager {
    txnum: TxnId,
    log_manager: Arc<LogManager>,
    buffer_pool: Arc<BufferPoolManager>,
}

impl RecoveryManager {
    /// Create the manager and write the transaction's start record
    pub fn new(txnum: TxnId, log_manager: Arc<LogManager>, buffer_pool: Arc<BufferPoolManager>) -> Result<Self> {
        LogRecord::Start { txnum }.write_to_log(&log_manager)?;
        Ok(Self {
            txnum,
            log_manager,
            buffer_pool,
        })
    }

    /// Force the transaction's buffers, then write and flush its commit record
    pub fn commit(&self) -> Result<()> {
        self.buffer_pool.flush_all(self.txnum)?;
        let lsn = LogRecord::Commit { txnum: self.txnum }.write_to_log(&self.log_manager)?;
        self.log_manager.flush(lsn)?;
        Ok(())
    }

    /// Undo every change of the transaction, then write a rollback record
    pub fn rollback(&self, txn: &mut Transaction) -> Result<()> {
        self.do_rollback(txn)?;
        self.buffer_pool.flush_all(self.txnum)?;
        let lsn = LogRecord::Rollback { txnum: self.txnum }.write_to_log(&self.log_manager)?;
        self.log_manager.flush(lsn)?;
        Ok(())
    }

    /// Undo the changes of every transaction that did not finish before
    /// the last checkpoint, then write a new checkpoint
    pub fn recover(&self, txn: &mut Transaction) -> Result<()> {
        self.do_recover(txn)?;
        self.buffer_pool.flush_all(self.txnum)?;
        let lsn = LogRecord::Checkpoint.write_to_log(&self.log_manager)?;
        self.log_manager.flush(lsn)?;
        Ok(())
    }

    /// Log the current integer at `offset` before it is overwritten
    pub fn set_int(&self, page: &Page, block: &BlockId, offset: usize) -> Result<Lsn> {
        let record = LogRecord::SetInt {
            txnum: self.txnum,
            block: block.clone(),
            offset,
            old_value: page.get_int(offset)?,
        };
        record.write_to_log(&self.log_manager)
    }

    /// Log the current string at `offset` before it is overwritten
    pub fn set_string(&self, page: &Page, block: &BlockId, offset: usize) -> Result<Lsn> {
        let record = LogRecord::SetString {
            txnum: self.txnum,
            block: block.clone(),
            offset,
            old_value: page.get_string(offset)?,
        };
        record.write_to_log(&self.log_manager)
    }

    fn do_rollback(&self, txn: &mut Transaction) -> Result<()> {
        for bytes in self.log_manager.iterator()? {
            let record = LogRecord::from_bytes(&bytes?)?;
            if record.txnum() != Some(self.txnum) {
                continue;
            }
            if record == (LogRecord::Start { txnum: self.txnum }) {
                break;
            }
            debug!("undoing {}", record);
            record.undo(txn)?;
        }
        Ok(())
    }

    fn do_recover(&self, txn: &mut Transaction) -> Result<()> {
        let mut finished = HashSet::new();
        let mut undone = 0usize;

        for bytes in self.log_manager.iterator()? {
            let record = LogRecord::from_bytes(&bytes?)?;
            match &record {
                LogRecord::Checkpoint => break,
                LogRecord::Commit { txnum } | LogRecord::Rollback { txnum } => {
                    finished.insert(*txnum);
                }
                LogRecord::SetInt { txnum, .. } | LogRecord::SetString { txnum, .. } => {
                    if !finished.contains(txnum) {
                        debug!("undoing {}", record);
                        record.undo(txn)?;
                        undone += 1;
                    }
                }
                LogRecord::Start { .. } => {}
            }
        }

        info!("recovery undid {} changes of unfinished transactions", undone);
        Ok(())
    }
}

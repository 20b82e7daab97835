use std::collections::HashMap;
use std::sync::Arc;

use crate::storage::disk::BlockId;
use crate::transaction::concurrency::lock_table::{LockTable, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockType {
    Shared,
    Exclusive,
}

/// Per-transaction view of the lock table.
///
/// Remembers which locks its transaction already holds so repeated
/// requests never reach the shared table, and releases them all at once
/// when the transaction ends.
pub struct ConcurrencyManager {
    lock_table: Arc<LockTable>,
    locks: HashMap<BlockId, LockType>,
}

impl ConcurrencyManager {
    pub fn new(lock_table: Arc<LockTable>) -> Self {
        Self {
            lock_table,
            locks: HashMap::new(),
        }
    }

    /// Obtain a shared lock unless any lock on the block is already held
    pub fn s_lock(&mut self, block: &BlockId) -> Result<()> {
        if !self.locks.contains_key(block) {
            self.lock_table.s_lock(block)?;
            self.locks.insert(block.clone(), LockType::Shared);
        }
        Ok(())
    }

    /// Obtain an exclusive lock, taking a shared lock first and upgrading it
    pub fn x_lock(&mut self, block: &BlockId) -> Result<()> {
        if !self.has_x_lock(block) {
            self.s_lock(block)?;
            self.lock_table.x_lock(block)?;
            self.locks.insert(block.clone(), LockType::Exclusive);
        }
        Ok(())
    }

    /// Release every lock held by the transaction
    pub fn release(&mut self) {
        for block in self.locks.keys() {
            self.lock_table.unlock(block);
        }
        self.locks.clear();
    }

    pub fn has_x_lock(&self, block: &BlockId) -> bool {
        self.locks.get(block) == Some(&LockType::Exclusive)
    }

    pub fn holds_lock(&self, block: &BlockId) -> bool {
        self.locks.contains_key(block)
    }
}

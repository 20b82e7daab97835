use std::collections::HashMap;
use std::sync::Arc;

use crate::common::types::BufferId;
use crate::storage::buffer::BufferPoolManager;
use crate::storage::disk::BlockId;
use crate::transaction::concurrency::transaction::{Result, TransactionError};

/// The buffers pinned by one transaction.
///
/// A block may be pinned several times; each pin must be matched by an
/// unpin before the block leaves the list.
pub struct BufferList {
    buffers: HashMap<BlockId, BufferId>,
    pins: Vec<BlockId>,
    buffer_pool: Arc<BufferPoolManager>,
}

impl BufferList {
    pub fn new(buffer_pool: Arc<BufferPoolManager>) -> Self {
        Self {
            buffers: HashMap::new(),
            pins: Vec::new(),
            buffer_pool,
        }
    }

    /// Buffer holding `block`, if the transaction has it pinned
    pub fn buffer(&self, block: &BlockId) -> Option<BufferId> {
        self.buffers.get(block).copied()
    }

    pub fn pin(&mut self, block: &BlockId) -> Result<BufferId> {
        let id = self.buffer_pool.pin(block)?;
        self.buffers.insert(block.clone(), id);
        self.pins.push(block.clone());
        Ok(id)
    }

    pub fn unpin(&mut self, block: &BlockId) -> Result<()> {
        let id = self
            .buffer(block)
            .ok_or_else(|| TransactionError::BlockNotPinned(block.clone()))?;
        self.buffer_pool.unpin(id)?;

        if let Some(pos) = self.pins.iter().position(|b| b == block) {
            self.pins.remove(pos);
        }
        if !self.pins.contains(block) {
            self.buffers.remove(block);
        }
        Ok(())
    }

    /// Release every pin still held
    pub fn unpin_all(&mut self) -> Result<()> {
        for block in self.pins.drain(..) {
            if let Some(&id) = self.buffers.get(&block) {
                self.buffer_pool.unpin(id)?;
            }
        }
        self.buffers.clear();
        Ok(())
    }

    pub fn pinned_count(&self) -> usize {
        self.pins.len()
    }
}

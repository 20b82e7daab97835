use std::sync::Arc;
use std::time::{Duration, Instant};
use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use crate::common::types::{BufferId, Lsn, PagePtr, TxnId, DEFAULT_MAX_WAIT};
use crate::storage::buffer::buffer::Buffer;
use crate::storage::buffer::error::BufferPoolError;
use crate::storage::buffer::replacer::{ReplacementPolicy, Replacer};
use crate::storage::disk::{BlockId, FileManager};
use crate::transaction::wal::LogManager;

/// Result type for buffer pool operations
pub type Result<T> = std::result::Result<T, BufferPoolError>;

struct PoolState {
    buffers: Vec<Buffer>,
    num_available: usize,
    replacer: Box<dyn Replacer>,
}

/// Fixed-size pool of page buffers shared by all transactions.
///
/// Clients pin a block to get a buffer id, work on the page through
/// [`BufferPoolManager::contents`] and unpin it when they are done. When no
/// buffer is free, `pin` waits for one to be released, up to `max_wait`.
///
/// Page guards obtained from `contents` must be dropped before calling back
/// into the pool.
pub struct BufferPoolManager {
    state: Mutex<PoolState>,
    buffer_released: Condvar,
    max_wait: Duration,
}

impl BufferPoolManager {
    pub fn new(file_manager: Arc<FileManager>, log_manager: Arc<LogManager>, pool_size: usize) -> Self {
        Self::with_policy(file_manager, log_manager, pool_size, ReplacementPolicy::default())
    }

    pub fn with_policy(
        file_manager: Arc<FileManager>,
        log_manager: Arc<LogManager>,
        pool_size: usize,
        policy: ReplacementPolicy,
    ) -> Self {
        let buffers = (0..pool_size)
            .map(|_| Buffer::new(file_manager.clone(), log_manager.clone()))
            .collect();

        debug!("buffer pool created with {} buffers, {} replacement", pool_size, policy);

        Self {
            state: Mutex::new(PoolState {
                buffers,
                num_available: pool_size,
                replacer: policy.build(pool_size),
            }),
            buffer_released: Condvar::new(),
            max_wait: DEFAULT_MAX_WAIT,
        }
    }

    /// Override how long `pin` waits for a free buffer
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Number of buffers in the pool
    pub fn size(&self) -> usize {
        self.state.lock().buffers.len()
    }

    /// Number of unpinned buffers
    pub fn available(&self) -> usize {
        self.state.lock().num_available
    }

    /// Pin a buffer to `block`, reading the block from disk if no buffer
    /// already holds it
    pub fn pin(&self, block: &BlockId) -> Result<BufferId> {
        let mut state = self.state.lock();
        let deadline = Instant::now() + self.max_wait;

        loop {
            if let Some(id) = Self::try_to_pin(&mut state, block)? {
                return Ok(id);
            }
            if self.buffer_released.wait_until(&mut state, deadline).timed_out() {
                // A release may have raced with the timeout
                if let Some(id) = Self::try_to_pin(&mut state, block)? {
                    return Ok(id);
                }
                warn!("timed out after {:?} waiting for a buffer for {}", self.max_wait, block);
                return Err(BufferPoolError::BufferTimeout {
                    block: block.clone(),
                    waited: self.max_wait,
                });
            }
        }
    }

    /// Release one pin on a buffer, waking waiters when it becomes free
    pub fn unpin(&self, id: BufferId) -> Result<()> {
        let mut state = self.state.lock();
        let state = &mut *state;
        let buffer = state.buffers.get_mut(id).ok_or(BufferPoolError::InvalidBuffer(id))?;

        if !buffer.is_pinned() {
            return Err(BufferPoolError::NotPinned(id));
        }
        buffer.unpin();

        if !buffer.is_pinned() {
            state.num_available += 1;
            state.replacer.unpinned(id);
            self.buffer_released.notify_all();
        }
        Ok(())
    }

    /// Write every buffer modified by `txnum` to disk
    pub fn flush_all(&self, txnum: TxnId) -> Result<()> {
        let mut state = self.state.lock();
        for buffer in state.buffers.iter_mut() {
            if buffer.modifying_txn() == Some(txnum) {
                buffer.flush()?;
            }
        }
        Ok(())
    }

    /// Shared handle to the page held by a buffer
    pub fn contents(&self, id: BufferId) -> Result<PagePtr> {
        self.with_buffer(id, |buffer| buffer.contents().clone())
    }

    /// The block a buffer currently holds
    pub fn block(&self, id: BufferId) -> Result<Option<BlockId>> {
        self.with_buffer(id, |buffer| buffer.block().cloned())
    }

    pub fn is_pinned(&self, id: BufferId) -> Result<bool> {
        self.with_buffer(id, Buffer::is_pinned)
    }

    pub fn modifying_txn(&self, id: BufferId) -> Result<Option<TxnId>> {
        self.with_buffer(id, Buffer::modifying_txn)
    }

    /// Record that `txnum` changed the buffer's page. `lsn` is the LSN of
    /// the log record describing the change, or `None` for an unlogged one.
    pub fn set_modified(&self, id: BufferId, txnum: TxnId, lsn: Option<Lsn>) -> Result<()> {
        let mut state = self.state.lock();
        let buffer = state.buffers.get_mut(id).ok_or(BufferPoolError::InvalidBuffer(id))?;
        buffer.set_modified(txnum, lsn);
        Ok(())
    }

    fn with_buffer<T>(&self, id: BufferId, f: impl FnOnce(&Buffer) -> T) -> Result<T> {
        let state = self.state.lock();
        state.buffers.get(id).map(f).ok_or(BufferPoolError::InvalidBuffer(id))
    }

    /// One attempt at pinning; `Ok(None)` means every buffer is pinned
    fn try_to_pin(state: &mut PoolState, block: &BlockId) -> Result<Option<BufferId>> {
        let existing = state
            .buffers
            .iter()
            .position(|buffer| buffer.block() == Some(block));

        let id = match existing {
            Some(id) => id,
            None => {
                let Some(id) = state.replacer.victim(&state.buffers) else {
                    return Ok(None);
                };
                if let Err(e) = state.buffers[id].assign_to_block(block.clone()) {
                    state.replacer.unpinned(id);
                    return Err(e);
                }
                id
            }
        };

        let buffer = &mut state.buffers[id];
        if !buffer.is_pinned() {
            state.num_available -= 1;
            state.replacer.pinned(id);
        }
        buffer.pin();
        Ok(Some(id))
    }
}

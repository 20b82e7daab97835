use std::collections::HashMap;
use std::time::{Duration, Instant};
use log::warn;
use parking_lot::{Condvar, Mutex, MutexGuard};
use thiserror::Error;

use crate::common::types::DEFAULT_MAX_WAIT;
use crate::storage::disk::BlockId;

/// Error type for lock operations
#[derive(Error, Debug)]
pub enum LockError {
    #[error("could not lock {block} within {waited:?}")]
    LockTimeout { block: BlockId, waited: Duration },
}

/// Result type for lock operations
pub type Result<T> = std::result::Result<T, LockError>;

/// Lock held on a block. Unlocked blocks have no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockState {
    Shared(u32),
    Exclusive,
}

/// Block-level shared/exclusive locks shared by every transaction of a
/// database.
///
/// Waiters block on one condition variable and re-check their condition on
/// every release. A request that cannot be granted within `max_wait` fails
/// with [`LockError::LockTimeout`]; this is the only deadlock resolution.
pub struct LockTable {
    locks: Mutex<HashMap<BlockId, LockState>>,
    lock_released: Condvar,
    max_wait: Duration,
}

impl LockTable {
    pub fn new() -> Self {
        Self::with_max_wait(DEFAULT_MAX_WAIT)
    }

    pub fn with_max_wait(max_wait: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            lock_released: Condvar::new(),
            max_wait,
        }
    }

    /// Take a shared lock, waiting while another transaction holds the
    /// block exclusively
    pub fn s_lock(&self, block: &BlockId) -> Result<()> {
        let mut locks = self.wait_while(block, |state| state == Some(LockState::Exclusive))?;
        let next = match locks.get(block) {
            Some(LockState::Shared(n)) => LockState::Shared(n + 1),
            _ => LockState::Shared(1),
        };
        locks.insert(block.clone(), next);
        Ok(())
    }

    /// Take an exclusive lock. The caller must already hold a shared lock
    /// on the block, so it waits until it is the only shared holder left.
    pub fn x_lock(&self, block: &BlockId) -> Result<()> {
        let mut locks = self.wait_while(block, |state| matches!(state, Some(LockState::Shared(n)) if n > 1))?;
        locks.insert(block.clone(), LockState::Exclusive);
        Ok(())
    }

    /// Release one lock on the block
    pub fn unlock(&self, block: &BlockId) {
        let mut locks = self.locks.lock();
        if let Some(LockState::Shared(n)) = locks.get_mut(block) {
            if *n > 1 {
                *n -= 1;
                // A single remaining holder may be waiting to upgrade
                if *n == 1 {
                    self.lock_released.notify_all();
                }
                return;
            }
        }
        locks.remove(block);
        self.lock_released.notify_all();
    }

    fn wait_while(
        &self,
        block: &BlockId,
        blocked: impl Fn(Option<LockState>) -> bool,
    ) -> Result<MutexGuard<'_, HashMap<BlockId, LockState>>> {
        let mut locks = self.locks.lock();
        let deadline = Instant::now() + self.max_wait;

        while blocked(locks.get(block).copied()) {
            if self.lock_released.wait_until(&mut locks, deadline).timed_out() {
                if !blocked(locks.get(block).copied()) {
                    break;
                }
                warn!("lock request on {} timed out after {:?}", block, self.max_wait);
                return Err(LockError::LockTimeout {
                    block: block.clone(),
                    waited: self.max_wait,
                });
            }
        }
        Ok(locks)
    }
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new()
    }
}

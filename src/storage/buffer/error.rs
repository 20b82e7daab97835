use std::time::Duration;
use thiserror::Error;

use crate::common::types::BufferId;
use crate::storage::disk::{BlockId, FileError};
use crate::transaction::wal::LogError;

#[derive(Error, Debug)]
pub enum BufferPoolError {
    #[error("no buffer became available for {block} within {waited:?}")]
    BufferTimeout { block: BlockId, waited: Duration },
    #[error("buffer {0} is not pinned")]
    NotPinned(BufferId),
    #[error("buffer {0} does not exist in the pool")]
    InvalidBuffer(BufferId),
    #[error("Disk error: {0}")]
    FileError(#[from] FileError),
    #[error("Log error: {0}")]
    LogError(#[from] LogError),
}

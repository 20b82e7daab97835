use std::time::Duration;

use crate::common::types::{DEFAULT_BLOCK_SIZE, DEFAULT_BUFFER_COUNT, DEFAULT_LOG_FILE, DEFAULT_MAX_WAIT};
use crate::storage::buffer::ReplacementPolicy;

/// Settings used when opening a database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Size of every block and page in bytes
    pub block_size: usize,
    /// Number of buffers in the buffer pool
    pub buffer_count: usize,
    /// Name of the log file inside the database directory
    pub log_file: String,
    /// Bound on buffer and lock waits
    pub max_wait: Duration,
    pub replacement_policy: ReplacementPolicy,
    /// Sync data files after every block write
    pub force_sync: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            buffer_count: DEFAULT_BUFFER_COUNT,
            log_file: DEFAULT_LOG_FILE.to_string(),
            max_wait: DEFAULT_MAX_WAIT,
            replacement_policy: ReplacementPolicy::default(),
            force_sync: true,
        }
    }
}

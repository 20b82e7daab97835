use std::sync::Arc;
use std::time::Duration;
use parking_lot::RwLock;

use crate::storage::page::Page;

/// Default block size in bytes
pub const DEFAULT_BLOCK_SIZE: usize = 400;

/// Default number of buffers in the pool
pub const DEFAULT_BUFFER_COUNT: usize = 8;

/// Default name of the log file inside the database directory
pub const DEFAULT_LOG_FILE: &str = "kura.log";

/// How long a pin or lock request waits before giving up
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(10);

/// Files with this prefix are temporary and purged at startup
pub const TEMP_FILE_PREFIX: &str = "temp";

/// Size of an encoded integer
pub const INT_SIZE: usize = 4;

/// Block number within a file
pub type BlockNum = u64;

/// Transaction ID type
pub type TxnId = u32;

/// LSN (Log Sequence Number) type
pub type Lsn = u64;

/// Index of a buffer inside the buffer pool
pub type BufferId = usize;

/// Smart pointer to the page held by a buffer
pub type PagePtr = Arc<RwLock<Page>>;

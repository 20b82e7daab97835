// Kura Database Engine
//
// Transactional storage core: pages over disk blocks, a bounded buffer pool,
// a back-to-front write-ahead log and a block-level lock table.

pub mod common;
pub mod database;
pub mod storage;
pub mod transaction;

// Re-export key items for convenient access
pub use common::types::{BufferId, Lsn, TxnId};
pub use database::{Database, DatabaseConfig, DatabaseError};
pub use storage::buffer::{BufferPoolError, BufferPoolManager, ReplacementPolicy};
pub use storage::disk::{BlockId, FileError, FileManager};
pub use storage::page::{Page, PageError};
pub use transaction::concurrency::{ConcurrencyManager, LockError, LockTable};
pub use transaction::wal::{LogError, LogManager, LogRecord};
pub use transaction::{Transaction, TransactionError, TransactionManager};

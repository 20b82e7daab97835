// Kura Transaction Management Module

pub mod concurrency;
pub mod recovery;
pub mod wal;

// Public exports
pub use concurrency::{Transaction, TransactionError, TransactionManager, TransactionState};
pub use recovery::RecoveryManager;
pub use wal::{LogManager, LogRecord, LogRecordType};

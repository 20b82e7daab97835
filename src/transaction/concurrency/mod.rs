// Transaction concurrency module exports

pub mod buffer_list;
pub mod concurrency_manager;
pub mod lock_table;
pub mod transaction;
pub mod transaction_manager;

// Public exports
pub use buffer_list::BufferList;
pub use concurrency_manager::ConcurrencyManager;
pub use lock_table::{LockError, LockTable};
pub use transaction::{Transaction, TransactionError, TransactionState};
pub use transaction_manager::TransactionManager;

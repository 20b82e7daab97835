// Kura Database bootstrap
//
// Wires the file, log, buffer and lock services of one database directory
// together and recovers the directory when it already exists.

mod config;

use std::path::Path;
use std::sync::Arc;
use log::info;
use thiserror::Error;

use crate::storage::buffer::BufferPoolManager;
use crate::storage::disk::{FileError, FileManager};
use crate::transaction::concurrency::LockTable;
use crate::transaction::wal::{LogError, LogManager};
use crate::transaction::{Transaction, TransactionError, TransactionManager};

pub use config::DatabaseConfig;

/// Errors that can occur while opening or using a database
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Disk error: {0}")]
    FileError(#[from] FileError),

    #[error("Log error: {0}")]
    LogError(#[from] LogError),

    #[error("Transaction error: {0}")]
    TransactionError(#[from] TransactionError),
}

/// Result type for database operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// An open database directory
pub struct Database {
    config: DatabaseConfig,
    file_manager: Arc<FileManager>,
    log_manager: Arc<LogManager>,
    buffer_pool: Arc<BufferPoolManager>,
    lock_table: Arc<LockTable>,
    transaction_manager: TransactionManager,
}

impl Database {
    /// Open `dir` with the default configuration
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(dir, DatabaseConfig::default())
    }

    /// Open `dir`, creating it if needed. An existing directory is
    /// recovered before the database is returned.
    pub fn open_with_config(dir: impl AsRef<Path>, config: DatabaseConfig) -> Result<Self> {
        let file_manager = Arc::new(FileManager::with_sync(dir, config.block_size, config.force_sync)?);
        let log_manager = Arc::new(LogManager::new(file_manager.clone(), config.log_file.clone())?);
        let buffer_pool = Arc::new(
            BufferPoolManager::with_policy(
                file_manager.clone(),
                log_manager.clone(),
                config.buffer_count,
                config.replacement_policy,
            )
            .with_max_wait(config.max_wait),
        );
        let lock_table = Arc::new(LockTable::with_max_wait(config.max_wait));
        let transaction_manager = TransactionManager::new(
            file_manager.clone(),
            log_manager.clone(),
            buffer_pool.clone(),
            lock_table.clone(),
        );

        let db = Self {
            config,
            file_manager,
            log_manager,
            buffer_pool,
            lock_table,
            transaction_manager,
        };

        if db.file_manager.is_new() {
            info!("creating new database in {}", db.file_manager.db_directory().display());
        } else {
            info!("recovering existing database in {}", db.file_manager.db_directory().display());
            let mut txn = db.new_transaction()?;
            txn.recover()?;
            txn.commit()?;
        }

        Ok(db)
    }

    /// Start a transaction
    pub fn new_transaction(&self) -> Result<Transaction> {
        Ok(self.transaction_manager.begin()?)
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn file_manager(&self) -> &Arc<FileManager> {
        &self.file_manager
    }

    pub fn log_manager(&self) -> &Arc<LogManager> {
        &self.log_manager
    }

    pub fn buffer_pool(&self) -> &Arc<BufferPoolManager> {
        &self.buffer_pool
    }

    pub fn lock_table(&self) -> &Arc<LockTable> {
        &self.lock_table
    }
}

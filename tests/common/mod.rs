#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use tempfile::TempDir;

use kuradb::{BufferPoolManager, Database, DatabaseConfig, FileManager, LogManager};

pub const TEST_BLOCK_SIZE: usize = 400;

/// File, log and buffer services over a fresh temporary directory
pub struct TestServices {
    pub dir: TempDir,
    pub file_manager: Arc<FileManager>,
    pub log_manager: Arc<LogManager>,
    pub buffer_pool: Arc<BufferPoolManager>,
}

// Create buffer pool services with a short wait bound
pub fn create_test_services(pool_size: usize, max_wait: Duration) -> Result<TestServices> {
    let dir = TempDir::new()?;
    let file_manager = Arc::new(FileManager::new(dir.path(), TEST_BLOCK_SIZE)?);
    let log_manager = Arc::new(LogManager::new(file_manager.clone(), "test.log")?);
    let buffer_pool = Arc::new(
        BufferPoolManager::new(file_manager.clone(), log_manager.clone(), pool_size).with_max_wait(max_wait),
    );
    Ok(TestServices {
        dir,
        file_manager,
        log_manager,
        buffer_pool,
    })
}

// Configuration with small pool and quick timeouts
pub fn test_config(buffer_count: usize, max_wait: Duration) -> DatabaseConfig {
    DatabaseConfig {
        buffer_count,
        max_wait,
        force_sync: false,
        ..DatabaseConfig::default()
    }
}

// Open a database in a subdirectory that does not exist yet
pub fn create_test_database(config: DatabaseConfig) -> Result<(Database, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db = Database::open_with_config(temp_dir.path().join("db"), config)?;
    Ok((db, temp_dir))
}

// Generate test data of specified size
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

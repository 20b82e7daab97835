// Database Integration Tests

use std::time::Duration;
use anyhow::Result;
use tempfile::TempDir;

use kuradb::{BlockId, Database, TransactionError};

#[path = "../common/mod.rs"]
mod common;
use common::{create_test_database, test_config};

#[test]
fn test_committed_value_survives_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("db");
    let blk = BlockId::new("t.tbl", 0);

    {
        let db = Database::open(&dir)?;
        let mut txn = db.new_transaction()?;
        txn.pin(&blk)?;
        txn.set_int(&blk, 0, 42, true)?;
        txn.commit()?;
    }

    let db = Database::open(&dir)?;
    let mut txn = db.new_transaction()?;
    txn.pin(&blk)?;
    assert_eq!(txn.get_int(&blk, 0)?, 42);
    txn.commit()?;
    Ok(())
}

#[test]
fn test_append_and_size() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(8, Duration::from_millis(500)))?;

    let mut txn = db.new_transaction()?;
    assert_eq!(txn.size("t.tbl")?, 0);
    let first = txn.append("t.tbl")?;
    let second = txn.append("t.tbl")?;
    assert_eq!(first, BlockId::new("t.tbl", 0));
    assert_eq!(second, BlockId::new("t.tbl", 1));
    assert_eq!(txn.size("t.tbl")?, 2);
    txn.commit()?;
    Ok(())
}

#[test]
fn test_strings_and_ints_share_a_block() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(8, Duration::from_millis(500)))?;
    let blk = BlockId::new("mixed.tbl", 3);

    let mut txn = db.new_transaction()?;
    txn.pin(&blk)?;
    txn.set_int(&blk, 0, -17, true)?;
    txn.set_string(&blk, 4, "hello kura", true)?;
    txn.set_int(&blk, 100, i32::MAX, true)?;
    txn.commit()?;

    let mut txn = db.new_transaction()?;
    txn.pin(&blk)?;
    assert_eq!(txn.get_int(&blk, 0)?, -17);
    assert_eq!(txn.get_string(&blk, 4)?, "hello kura");
    assert_eq!(txn.get_int(&blk, 100)?, i32::MAX);
    txn.commit()?;
    Ok(())
}

#[test]
fn test_page_overflow_is_reported() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(8, Duration::from_millis(500)))?;
    let blk = BlockId::new("t.tbl", 0);

    let mut txn = db.new_transaction()?;
    txn.pin(&blk)?;
    let block_size = txn.block_size();
    let err = txn.set_int(&blk, block_size - 2, 1, true).unwrap_err();
    assert!(matches!(err, TransactionError::PageError(_)));
    assert!(!err.is_abort_signal());
    txn.rollback()?;
    Ok(())
}

#[test]
fn test_too_many_pins_time_out() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(2, Duration::from_millis(200)))?;

    let mut txn = db.new_transaction()?;
    txn.pin(&BlockId::new("t.tbl", 0))?;
    txn.pin(&BlockId::new("t.tbl", 1))?;
    assert_eq!(txn.available_buffers(), 0);

    let err = txn.pin(&BlockId::new("t.tbl", 2)).unwrap_err();
    assert!(err.is_abort_signal());
    txn.rollback()?;
    assert_eq!(db.buffer_pool().available(), 2);
    Ok(())
}

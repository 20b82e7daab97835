// Recovery Integration Tests

use std::time::Duration;
use anyhow::Result;
use tempfile::TempDir;

use kuradb::{BlockId, Database, LogRecord, Page};

#[path = "../common/mod.rs"]
mod common;
use common::{create_test_database, test_config};

#[test]
fn test_rollback_restores_previous_values() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(8, Duration::from_millis(500)))?;
    let blk = BlockId::new("t.tbl", 1);

    let mut txn = db.new_transaction()?;
    txn.pin(&blk)?;
    txn.set_int(&blk, 80, 1, true)?;
    txn.set_string(&blk, 40, "one", true)?;
    txn.commit()?;

    let mut txn = db.new_transaction()?;
    txn.pin(&blk)?;
    txn.set_int(&blk, 80, 2, true)?;
    txn.set_string(&blk, 40, "two", true)?;
    assert_eq!(txn.get_int(&blk, 80)?, 2);
    txn.rollback()?;

    let mut txn = db.new_transaction()?;
    txn.pin(&blk)?;
    assert_eq!(txn.get_int(&blk, 80)?, 1);
    assert_eq!(txn.get_string(&blk, 40)?, "one");
    txn.commit()?;
    Ok(())
}

#[test]
fn test_restart_undoes_uncommitted_changes_on_disk() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("db");
    let committed = BlockId::new("t.tbl", 0);
    let uncommitted = BlockId::new("t.tbl", 1);

    {
        let db = Database::open_with_config(&dir, test_config(8, Duration::from_millis(500)))?;

        let mut txn = db.new_transaction()?;
        txn.pin(&committed)?;
        txn.set_int(&committed, 0, 100, true)?;
        txn.commit()?;

        let mut txn = db.new_transaction()?;
        txn.pin(&uncommitted)?;
        txn.set_int(&uncommitted, 0, 999, true)?;
        txn.set_string(&uncommitted, 20, "dirty", true)?;
        // Force the uncommitted page to disk, as an eviction would
        db.buffer_pool().flush_all(txn.txnum())?;
        std::mem::forget(txn);
    }

    let mut page = Page::new(400);
    let fm = kuradb::FileManager::new(&dir, 400)?;
    fm.read(&uncommitted, &mut page)?;
    assert_eq!(page.get_int(0)?, 999);
    drop(fm);

    let db = Database::open_with_config(&dir, test_config(8, Duration::from_millis(500)))?;
    let mut txn = db.new_transaction()?;
    txn.pin(&committed)?;
    txn.pin(&uncommitted)?;
    assert_eq!(txn.get_int(&committed, 0)?, 100);
    assert_eq!(txn.get_int(&uncommitted, 0)?, 0);
    assert_eq!(txn.get_string(&uncommitted, 20)?, "");
    txn.commit()?;
    Ok(())
}

#[test]
fn test_recovery_writes_checkpoint() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("db");
    {
        let db = Database::open(&dir)?;
        let mut txn = db.new_transaction()?;
        txn.append("t.tbl")?;
        txn.commit()?;
    }

    let db = Database::open(&dir)?;
    let records = db
        .log_manager()
        .iterator()?
        .map(|bytes| -> Result<LogRecord> { Ok(LogRecord::from_bytes(&bytes?)?) })
        .collect::<Result<Vec<_>>>()?;

    // Newest first: recovery transaction's commit, then its checkpoint
    assert_eq!(records[0], LogRecord::Commit { txnum: 1 });
    assert_eq!(records[1], LogRecord::Checkpoint);
    assert_eq!(records[2], LogRecord::Start { txnum: 1 });
    Ok(())
}

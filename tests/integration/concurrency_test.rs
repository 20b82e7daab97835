// Concurrency Integration Tests

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use anyhow::Result;
use rand::Rng;

use kuradb::{BlockId, TransactionError};

#[path = "../common/mod.rs"]
mod common;
use common::{create_test_database, test_config};

#[test]
fn test_writer_excludes_writer() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(8, Duration::from_millis(200)))?;
    let blk = BlockId::new("t.tbl", 0);

    let mut first = db.new_transaction()?;
    first.pin(&blk)?;
    first.set_int(&blk, 0, 1, true)?;

    let mut second = db.new_transaction()?;
    second.pin(&blk)?;
    let err = second.set_int(&blk, 0, 2, true).unwrap_err();
    assert!(matches!(err, TransactionError::LockError(_)));
    second.rollback()?;

    first.commit()?;
    Ok(())
}

#[test]
fn test_reader_blocks_until_writer_commits() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(8, Duration::from_secs(5)))?;
    let db = &db;
    let blk = BlockId::new("t.tbl", 0);

    thread::scope(|s| -> Result<()> {
        let mut writer = db.new_transaction()?;
        writer.pin(&blk)?;
        writer.set_int(&blk, 0, 7, true)?;

        let (tx, rx) = mpsc::channel();
        let reader_blk = blk.clone();
        let reader = s.spawn(move || -> Result<i32> {
            let blk = reader_blk;
            let mut txn = db.new_transaction()?;
            txn.pin(&blk)?;
            let value = txn.get_int(&blk, 0)?;
            tx.send(())?;
            txn.commit()?;
            Ok(value)
        });

        // The reader is still waiting on the exclusive lock
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        writer.commit()?;

        let value = reader.join().expect("reader panicked")?;
        assert_eq!(value, 7);
        Ok(())
    })
}

#[test]
fn test_shared_readers_then_upgrade() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(8, Duration::from_secs(5)))?;
    let blk = BlockId::new("t.tbl", 0);

    thread::scope(|s| -> Result<()> {
        let mut upgrader = db.new_transaction()?;
        upgrader.pin(&blk)?;
        upgrader.get_int(&blk, 0)?;

        let mut reader = db.new_transaction()?;
        reader.pin(&blk)?;
        reader.get_int(&blk, 0)?;

        let upgrade_blk = blk.clone();
        let handle = s.spawn(move || -> Result<()> {
            // Waits until the other reader releases its shared lock
            upgrader.set_int(&upgrade_blk, 0, 3, true)?;
            upgrader.commit()?;
            Ok(())
        });

        thread::sleep(Duration::from_millis(200));
        assert!(!handle.is_finished());
        let released = Instant::now();
        reader.commit()?;
        handle.join().expect("upgrader panicked")?;
        assert!(released.elapsed() < Duration::from_millis(500));
        Ok(())
    })?;

    let mut txn = db.new_transaction()?;
    txn.pin(&blk)?;
    assert_eq!(txn.get_int(&blk, 0)?, 3);
    txn.commit()?;
    Ok(())
}

#[test]
fn test_lock_timeout_near_bound() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(8, Duration::from_millis(300)))?;
    let blk = BlockId::new("t.tbl", 0);

    let mut writer = db.new_transaction()?;
    writer.pin(&blk)?;
    writer.set_int(&blk, 0, 1, true)?;

    let mut reader = db.new_transaction()?;
    reader.pin(&blk)?;
    let start = Instant::now();
    let err = reader.get_int(&blk, 0).unwrap_err();
    let elapsed = start.elapsed();

    assert!(err.is_abort_signal());
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_secs(5));

    reader.rollback()?;
    writer.commit()?;
    Ok(())
}

#[test]
fn test_concurrent_increments_are_serialized() -> Result<()> {
    let (db, _temp_dir) = create_test_database(test_config(8, Duration::from_millis(200)))?;
    let blk = BlockId::new("counter.tbl", 0);

    thread::scope(|s| {
        for _ in 0..3 {
            s.spawn(|| {
                let mut rng = rand::thread_rng();
                let mut done = 0;
                while done < 5 {
                    let mut txn = db.new_transaction().expect("begin failed");
                    let result = (|| -> Result<(), TransactionError> {
                        txn.pin(&blk)?;
                        let value = txn.get_int(&blk, 0)?;
                        txn.set_int(&blk, 0, value + 1, true)?;
                        txn.commit()
                    })();
                    match result {
                        Ok(()) => done += 1,
                        // Two readers upgrading at once both time out; back off and retry
                        Err(e) if e.is_abort_signal() => {
                            txn.rollback().expect("rollback failed");
                            thread::sleep(Duration::from_millis(rng.gen_range(0..50)));
                        }
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            });
        }
    });

    let mut txn = db.new_transaction()?;
    txn.pin(&blk)?;
    assert_eq!(txn.get_int(&blk, 0)?, 15);
    txn.commit()?;
    Ok(())
}

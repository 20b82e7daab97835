use std::fmt;
use bincode::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::types::{Lsn, TxnId};
use crate::storage::disk::BlockId;
use crate::transaction::wal::LogManager;
use crate::transaction::{Transaction, TransactionError};

/// Error type for log record operations
#[derive(Error, Debug)]
pub enum LogRecordError {
    #[error("Failed to serialize log record: {0}")]
    Serialization(String),

    #[error("Failed to deserialize log record: {0}")]
    Deserialization(String),
}

/// Kinds of records written by the recovery manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogRecordType {
    Checkpoint,
    Start,
    Commit,
    Rollback,
    SetInt,
    SetString,
}

/// A typed log record.
///
/// Update records carry the value the location held *before* the change,
/// which is all undo-only recovery needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogRecord {
    /// Quiescent checkpoint: no earlier record is needed for recovery
    Checkpoint,
    Start { txnum: TxnId },
    Commit { txnum: TxnId },
    Rollback { txnum: TxnId },
    SetInt {
        txnum: TxnId,
        block: BlockId,
        offset: usize,
        old_value: i32,
    },
    SetString {
        txnum: TxnId,
        block: BlockId,
        offset: usize,
        old_value: String,
    },
}

impl LogRecord {
    /// Transaction that wrote the record; checkpoints belong to none
    pub fn txnum(&self) -> Option<TxnId> {
        match self {
            LogRecord::Checkpoint => None,
            LogRecord::Start { txnum }
            | LogRecord::Commit { txnum }
            | LogRecord::Rollback { txnum }
            | LogRecord::SetInt { txnum, .. }
            | LogRecord::SetString { txnum, .. } => Some(*txnum),
        }
    }

    pub fn record_type(&self) -> LogRecordType {
        match self {
            LogRecord::Checkpoint => LogRecordType::Checkpoint,
            LogRecord::Start { .. } => LogRecordType::Start,
            LogRecord::Commit { .. } => LogRecordType::Commit,
            LogRecord::Rollback { .. } => LogRecordType::Rollback,
            LogRecord::SetInt { .. } => LogRecordType::SetInt,
            LogRecord::SetString { .. } => LogRecordType::SetString,
        }
    }

    /// Serialize the record into the payload stored in the log
    pub fn to_bytes(&self) -> Result<Vec<u8>, LogRecordError> {
        serialize(self).map_err(|e| LogRecordError::Serialization(e.to_string()))
    }

    /// Decode a payload returned by the log iterator
    pub fn from_bytes(data: &[u8]) -> Result<Self, LogRecordError> {
        deserialize(data).map_err(|e| LogRecordError::Deserialization(e.to_string()))
    }

    /// Append the record to the log and return its LSN
    pub fn write_to_log(&self, log_manager: &LogManager) -> Result<Lsn, TransactionError> {
        let bytes = self.to_bytes()?;
        Ok(log_manager.append(&bytes)?)
    }

    /// Restore the value saved in an update record.
    ///
    /// The write itself is not logged. Records other than updates have
    /// nothing to undo.
    pub fn undo(&self, txn: &mut Transaction) -> Result<(), TransactionError> {
        match self {
            LogRecord::SetInt { block, offset, old_value, .. } => {
                txn.pin(block)?;
                let result = txn.set_int(block, *offset, *old_value, false);
                txn.unpin(block)?;
                result
            }
            LogRecord::SetString { block, offset, old_value, .. } => {
                txn.pin(block)?;
                let result = txn.set_string(block, *offset, old_value, false);
                txn.unpin(block)?;
                result
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogRecord::Checkpoint => write!(f, "<CHECKPOINT>"),
            LogRecord::Start { txnum } => write!(f, "<START {}>", txnum),
            LogRecord::Commit { txnum } => write!(f, "<COMMIT {}>", txnum),
            LogRecord::Rollback { txnum } => write!(f, "<ROLLBACK {}>", txnum),
            LogRecord::SetInt { txnum, block, offset, old_value } => {
                write!(f, "<SETINT {} {} {} {}>", txnum, block, offset, old_value)
            }
            LogRecord::SetString { txnum, block, offset, old_value } => {
                write!(f, "<SETSTRING {} {} {} {}>", txnum, block, offset, old_value)
            }
        }
    }
}

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::common::types::BlockNum;

/// Identifies one block of a named file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    file_name: String,
    number: BlockNum,
}

impl BlockId {
    /// Block number reserved for the virtual "end of file" marker. It is only
    /// ever used as a lock key and is never read from or written to disk.
    pub const END_OF_FILE: BlockNum = BlockNum::MAX;

    pub fn new(file_name: impl Into<String>, number: BlockNum) -> Self {
        Self {
            file_name: file_name.into(),
            number,
        }
    }

    /// The end-of-file marker for `file_name`
    pub fn end_of_file(file_name: impl Into<String>) -> Self {
        Self::new(file_name, Self::END_OF_FILE)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn number(&self) -> BlockNum {
        self.number
    }

    pub fn is_end_of_file(&self) -> bool {
        self.number == Self::END_OF_FILE
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_end_of_file() {
            write!(f, "[file {}, end of file]", self.file_name)
        } else {
            write!(f, "[file {}, block {}]", self.file_name, self.number)
        }
    }
}

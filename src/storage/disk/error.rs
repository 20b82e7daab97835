use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::storage::disk::BlockId;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("cannot read block {block}: {source}")]
    Read { block: BlockId, source: io::Error },
    #[error("cannot write block {block}: {source}")]
    Write { block: BlockId, source: io::Error },
    #[error("cannot append a block to {file_name}: {source}")]
    Append { file_name: String, source: io::Error },
    #[error("cannot access {file_name}: {source}")]
    Access { file_name: String, source: io::Error },
    #[error("cannot prepare database directory {path}: {source}")]
    Directory { path: PathBuf, source: io::Error },
    #[error("block {0} cannot be addressed on disk")]
    InvalidBlock(BlockId),
}

use std::str::Utf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("access of {len} bytes at offset {offset} overflows a page of {capacity} bytes")]
    Overflow { offset: usize, len: usize, capacity: usize },
    #[error("negative length prefix {len} at offset {offset}")]
    NegativeLength { offset: usize, len: i32 },
    #[error("string is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),
}

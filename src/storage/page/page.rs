use std::ops::Range;
use byteorder::{BigEndian, ByteOrder};

use crate::common::types::INT_SIZE;
use crate::storage::page::PageError;

/// A fixed-length sequence of bytes with typed accessors.
///
/// Integers are 4-byte big-endian. Byte arrays are stored as a 4-byte length
/// followed by the bytes, and strings as the byte array of their UTF-8 form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    data: Vec<u8>,
}

impl Page {
    /// Create a zeroed page of `block_size` bytes
    pub fn new(block_size: usize) -> Self {
        Self {
            data: vec![0; block_size],
        }
    }

    /// Wrap an existing byte vector; the page has the vector's length
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { data: bytes }
    }

    /// Bytes needed to store a byte array (or UTF-8 string) of `len` bytes
    pub fn max_length(len: usize) -> usize {
        INT_SIZE + len
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get_int(&self, offset: usize) -> Result<i32, PageError> {
        let range = self.range(offset, INT_SIZE)?;
        Ok(BigEndian::read_i32(&self.data[range]))
    }

    pub fn set_int(&mut self, offset: usize, value: i32) -> Result<(), PageError> {
        let range = self.range(offset, INT_SIZE)?;
        BigEndian::write_i32(&mut self.data[range], value);
        Ok(())
    }

    pub fn get_bytes(&self, offset: usize) -> Result<&[u8], PageError> {
        let len = self.get_int(offset)?;
        if len < 0 {
            return Err(PageError::NegativeLength { offset, len });
        }
        let range = self.range(offset + INT_SIZE, len as usize)?;
        Ok(&self.data[range])
    }

    pub fn set_bytes(&mut self, offset: usize, bytes: &[u8]) -> Result<(), PageError> {
        let range = self.range(offset, Self::max_length(bytes.len()))?;
        let (prefix, body) = self.data[range].split_at_mut(INT_SIZE);
        BigEndian::write_i32(prefix, bytes.len() as i32);
        body.copy_from_slice(bytes);
        Ok(())
    }

    pub fn get_string(&self, offset: usize) -> Result<String, PageError> {
        let bytes = self.get_bytes(offset)?;
        Ok(std::str::from_utf8(bytes)?.to_string())
    }

    pub fn set_string(&mut self, offset: usize, value: &str) -> Result<(), PageError> {
        self.set_bytes(offset, value.as_bytes())
    }

    /// Raw page contents, used by the file manager for I/O
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    pub fn contents_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn range(&self, offset: usize, len: usize) -> Result<Range<usize>, PageError> {
        let capacity = self.data.len();
        match offset.checked_add(len) {
            Some(end) if end <= capacity => Ok(offset..end),
            _ => Err(PageError::Overflow { offset, len, capacity }),
        }
    }
}

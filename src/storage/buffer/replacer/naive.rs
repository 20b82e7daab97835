use crate::common::types::BufferId;
use crate::storage::buffer::Buffer;
use super::Replacer;

/// Picks the first unpinned buffer in pool order
#[derive(Debug, Default)]
pub struct NaiveReplacer;

impl Replacer for NaiveReplacer {
    fn victim(&mut self, buffers: &[Buffer]) -> Option<BufferId> {
        buffers.iter().position(|buffer| !buffer.is_pinned())
    }
}

use std::collections::VecDeque;

use crate::common::types::BufferId;
use crate::storage::buffer::Buffer;
use super::Replacer;

/// LRU (Least Recently Used) replacement over unpinned buffers
pub struct LruReplacer {
    lru_list: VecDeque<BufferId>,
}

impl LruReplacer {
    /// Every buffer starts out unpinned and therefore replaceable
    pub fn new(pool_size: usize) -> Self {
        Self {
            lru_list: (0..pool_size).rev().collect(),
        }
    }

    /// Record that a buffer has become unpinned
    fn record_access(&mut self, buffer: BufferId) {
        self.remove(buffer);
        self.lru_list.push_front(buffer);
    }

    fn remove(&mut self, buffer: BufferId) {
        if let Some(pos) = self.lru_list.iter().position(|&id| id == buffer) {
            self.lru_list.remove(pos);
        }
    }
}

impl Replacer for LruReplacer {
    fn victim(&mut self, buffers: &[Buffer]) -> Option<BufferId> {
        while let Some(id) = self.lru_list.pop_back() {
            if !buffers[id].is_pinned() {
                return Some(id);
            }
        }
        None
    }

    fn pinned(&mut self, buffer: BufferId) {
        self.remove(buffer);
    }

    fn unpinned(&mut self, buffer: BufferId) {
        self.record_access(buffer);
    }
}

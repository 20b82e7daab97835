mod lru;
mod naive;

use std::fmt;
use std::str::FromStr;

use crate::common::types::BufferId;
use crate::storage::buffer::Buffer;

pub use lru::LruReplacer;
pub use naive::NaiveReplacer;

/// Chooses which unpinned buffer the pool reassigns to a new block.
///
/// The pool calls `pinned`/`unpinned` whenever a buffer moves between the
/// pinned and unpinned states, always while holding its lock.
pub trait Replacer: Send {
    /// Pick an unpinned buffer, or `None` if every buffer is pinned
    fn victim(&mut self, buffers: &[Buffer]) -> Option<BufferId>;

    fn pinned(&mut self, _buffer: BufferId) {}

    fn unpinned(&mut self, _buffer: BufferId) {}
}

/// Replacement policies selectable in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// First unpinned buffer in pool order
    #[default]
    Naive,
    /// Least recently unpinned buffer
    Lru,
}

impl ReplacementPolicy {
    pub(crate) fn build(self, pool_size: usize) -> Box<dyn Replacer> {
        match self {
            ReplacementPolicy::Naive => Box::new(NaiveReplacer),
            ReplacementPolicy::Lru => Box::new(LruReplacer::new(pool_size)),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementPolicy::Naive => write!(f, "naive"),
            ReplacementPolicy::Lru => write!(f, "lru"),
        }
    }
}

impl FromStr for ReplacementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" => Ok(ReplacementPolicy::Naive),
            "lru" => Ok(ReplacementPolicy::Lru),
            other => Err(format!("unknown replacement policy '{}' (expected naive or lru)", other)),
        }
    }
}

pub mod buffer;
pub mod error;
pub mod manager;
pub mod replacer;

pub use buffer::Buffer;
pub use error::BufferPoolError;
pub use manager::BufferPoolManager;
pub use replacer::{Replacer, ReplacementPolicy};

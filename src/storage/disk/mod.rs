pub mod block_id;
pub mod error;
pub mod file_manager;

pub use block_id::BlockId;
pub use error::FileError;
pub use file_manager::FileManager;

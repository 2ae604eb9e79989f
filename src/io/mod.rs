mod local;
mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

use std::path::Path;

use crate::error::Result;

/// Whole-file access to wherever archives and sounds live.
///
/// Archives are always read and written as complete buffers; nothing here
/// streams.
pub trait Storage: Send + Sync {
    /// Read the entire file
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Create or truncate the file and write the entire buffer
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove a directory and everything below it
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
}

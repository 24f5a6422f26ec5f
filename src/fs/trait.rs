//! FileSystem trait definition

use std::io;
use std::path::Path;

/// Abstraction over the filesystem lookups used during detection and tool resolution.
///
/// Every operation is a blocking, idempotent read of the local project tree, so
/// implementations must be safe to share across concurrent invocations.
pub trait FileSystem: Send + Sync {
    /// Check if a path exists (file, directory or a symlink that resolves)
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read the raw bytes of a file. Decoding is left to the caller.
    ///
    /// A missing file must surface as [`io::ErrorKind::NotFound`] so callers can
    /// tell absence apart from other I/O failures.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

//! FileSystem abstraction for the read-only lookups the detector and resolver perform

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::FileSystem;
pub use real::RealFileSystem;

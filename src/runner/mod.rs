//! Subprocess execution
//!
//! - [`command`]: [`CommandLine`], the argv to run
//! - [`outcome`]: [`ExecutionOutcome`], what happened when we tried
//! - [`executor`]: [`CommandRunner`], which spawns, captures combined output and
//!   honours cancellation

pub mod command;
pub mod executor;
pub mod outcome;

pub use command::CommandLine;
pub use executor::{CommandRunner, RunnerError};
pub use outcome::ExecutionOutcome;

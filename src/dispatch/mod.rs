//! Logical actions and their dispatch
//!
//! - [`action`]: the action catalogue (`install`, `run`, `test`, `analyze`)
//! - [`dispatcher`]: [`Dispatcher`], which turns a request into a command line and runs it

pub mod action;
pub mod dispatcher;

pub use action::{Action, ActionInfo, UsageError};
pub use dispatcher::{DispatchError, Dispatcher, ExecuteRequest};

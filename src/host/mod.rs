//! Host-protocol adapter
//!
//! Translates between the host's request/response shapes and the core detector
//! and dispatcher. The core modules never depend on anything in here, so a new
//! host protocol only needs another [`EcosystemPlugin`] implementation.

pub mod plugin;
pub mod wire;

pub use plugin::{EcosystemPlugin, HostError, PhpPlugin};
pub use wire::{
    CommandInfo, CommandRequest, ContextRequest, ContextResponse, ExecuteResponse, EXTENSION_NAME,
    USAGE_EXIT_CODE,
};

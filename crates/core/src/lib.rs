// crates/core/src/lib.rs

//! Command registry for tool-calling agents.
//!
//! Commands register a function and an OpenAI-style function schema into a
//! [`CommandRegistry`]. [`discovery`] populates a registry from a compiled-in
//! manifest, and [`presentation`] renders it for startup banners.

pub mod command;
pub mod config;
pub mod discovery;
pub mod error;
pub mod presentation;
pub mod registry;
pub mod types;

pub use command::{handler, typed, CommandArgs, CommandFn, CommandResult};
pub use config::{DiscoveryConfig, LoadFailurePolicy};
pub use discovery::{
    discover_commands, CategoryModule, CommandModule, Discovery, DiscoveryError, DiscoveryReport,
    Registrar,
};
pub use error::{CommandError, DispatchError, RegistryError};
pub use registry::{CommandRegistry, DuplicatePolicy, RegisteredCommand};
pub use types::CommandSchema;

// crates/host/src/commands/system_ops/mod.rs

//! Commands that need a desktop session.

pub mod screenshot;

use agent_commands_core::CategoryModule;

pub fn category() -> CategoryModule {
    CategoryModule::new("system_ops", vec![screenshot::MODULE])
}

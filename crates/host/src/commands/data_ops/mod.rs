// crates/host/src/commands/data_ops/mod.rs

pub mod text_analysis;

use agent_commands_core::CategoryModule;

pub fn category() -> CategoryModule {
    CategoryModule::new("data_ops", vec![text_analysis::MODULE])
}

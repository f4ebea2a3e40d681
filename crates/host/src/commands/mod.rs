// crates/host/src/commands/mod.rs

//! Concrete commands, one module per command, grouped by category.
//!
//! Each command module exposes a `MODULE` entry; [`manifest`] lists them for
//! discovery. The directory a command lives in is its display category.

pub mod common;
pub mod data_ops;
pub mod file_ops;
pub mod github_ops;
pub mod system_ops;
pub mod web_ops;

#[cfg(test)]
mod test_http;

use agent_commands_core::CategoryModule;

pub fn manifest() -> Vec<CategoryModule> {
    vec![
        data_ops::category(),
        file_ops::category(),
        github_ops::category(),
        system_ops::category(),
        web_ops::category(),
    ]
}

// crates/host/src/commands/file_ops/mod.rs

//! Local filesystem commands.

pub mod advanced_edit_file;
pub mod append_file;
pub mod convert_document;
pub mod create_directory;
pub mod delete_file;
pub mod edit_file;
pub mod file_exists;
pub mod list_directory;
pub mod load_json;
pub mod read_file;
pub mod save_json;
pub mod write_file;

use std::fs;
use std::path::Path;

use agent_commands_core::{CategoryModule, CommandError};

pub fn category() -> CategoryModule {
    CategoryModule::new(
        "file_ops",
        vec![
            read_file::MODULE,
            write_file::MODULE,
            append_file::MODULE,
            edit_file::MODULE,
            advanced_edit_file::MODULE,
            delete_file::MODULE,
            file_exists::MODULE,
            list_directory::MODULE,
            create_directory::MODULE,
            load_json::MODULE,
            save_json::MODULE,
            convert_document::MODULE,
        ],
    )
}

/// Create the parent directory of `file_path` if it is missing.
fn ensure_parent(file_path: &str) -> Result<(), CommandError> {
    match Path::new(file_path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| CommandError::from_io(e, parent))
        }
        _ => Ok(()),
    }
}

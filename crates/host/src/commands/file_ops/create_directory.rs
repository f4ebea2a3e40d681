// crates/host/src/commands/file_ops/create_directory.rs

use std::fs;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

pub const MODULE: CommandModule = CommandModule {
    name: "create_directory",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    directory_path: String,
}

fn create_directory(args: Args) -> CommandResult {
    fs::create_dir_all(&args.directory_path)
        .map_err(|e| CommandError::from_io(e, &args.directory_path))?;
    Ok(json!({ "message": format!("Successfully created directory {}", args.directory_path) }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "create_directory",
        typed(create_directory),
        json!({
            "type": "function",
            "function": {
                "name": "create_directory",
                "description": "Create a directory",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "directory_path": { "type": "string", "description": "Path to the directory to create" }
                    },
                    "required": ["directory_path"]
                }
            }
        }),
    )?;
    Ok(())
}

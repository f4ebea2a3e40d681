// crates/host/src/commands/file_ops/delete_file.rs

use std::fs;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

pub const MODULE: CommandModule = CommandModule {
    name: "delete_file",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    file_path: String,
}

fn delete_file(args: Args) -> CommandResult {
    fs::remove_file(&args.file_path).map_err(|e| CommandError::from_io(e, &args.file_path))?;
    Ok(json!({ "message": format!("Successfully deleted {}", args.file_path) }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "delete_file",
        typed(delete_file),
        json!({
            "type": "function",
            "function": {
                "name": "delete_file",
                "description": "Delete a file",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to delete" }
                    },
                    "required": ["file_path"]
                }
            }
        }),
    )?;
    Ok(())
}

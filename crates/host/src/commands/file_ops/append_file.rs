// crates/host/src/commands/file_ops/append_file.rs

use std::fs::OpenOptions;
use std::io::Write;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

use super::ensure_parent;

pub const MODULE: CommandModule = CommandModule {
    name: "append_file",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    file_path: String,
    content: String,
}

pub(super) fn append(file_path: &str, content: &str) -> Result<(), CommandError> {
    ensure_parent(file_path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)
        .map_err(|e| CommandError::from_io(e, file_path))?;
    file.write_all(content.as_bytes())
        .map_err(|e| CommandError::from_io(e, file_path))
}

fn append_file(args: Args) -> CommandResult {
    append(&args.file_path, &args.content)?;
    Ok(json!({ "message": format!("Successfully appended to {}", args.file_path) }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "append_file",
        typed(append_file),
        json!({
            "type": "function",
            "function": {
                "name": "append_file",
                "description": "Append content to a file",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to append to" },
                        "content": { "type": "string", "description": "Content to append to the file" }
                    },
                    "required": ["file_path", "content"]
                }
            }
        }),
    )?;
    Ok(())
}

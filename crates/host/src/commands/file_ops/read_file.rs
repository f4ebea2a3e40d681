// crates/host/src/commands/file_ops/read_file.rs

use std::fs;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

pub const MODULE: CommandModule = CommandModule {
    name: "read_file",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    file_path: String,
}

fn read_file(args: Args) -> CommandResult {
    let content =
        fs::read_to_string(&args.file_path).map_err(|e| CommandError::from_io(e, &args.file_path))?;
    Ok(json!({ "file_path": args.file_path, "content": content }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "read_file",
        typed(read_file),
        json!({
            "type": "function",
            "function": {
                "name": "read_file",
                "description": "Read the contents of a file",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to read" }
                    },
                    "required": ["file_path"]
                }
            }
        }),
    )?;
    Ok(())
}

// crates/host/src/commands/file_ops/load_json.rs

use std::fs;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};

pub const MODULE: CommandModule = CommandModule {
    name: "load_json",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    file_path: String,
}

fn load_json(args: Args) -> CommandResult {
    let raw =
        fs::read_to_string(&args.file_path).map_err(|e| CommandError::from_io(e, &args.file_path))?;
    let data: Value = serde_json::from_str(&raw)
        .map_err(|e| CommandError::invalid(format!("{} is not valid JSON: {}", args.file_path, e)))?;
    Ok(json!({ "file_path": args.file_path, "data": data }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "load_json",
        typed(load_json),
        json!({
            "type": "function",
            "function": {
                "name": "load_json",
                "description": "Load JSON data from a file",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to load from" }
                    },
                    "required": ["file_path"]
                }
            }
        }),
    )?;
    Ok(())
}

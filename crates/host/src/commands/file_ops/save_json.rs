// crates/host/src/commands/file_ops/save_json.rs

use std::fs;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ensure_parent;

pub const MODULE: CommandModule = CommandModule {
    name: "save_json",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    file_path: String,
    data: Value,
}

fn save_json(args: Args) -> CommandResult {
    ensure_parent(&args.file_path)?;
    let pretty = serde_json::to_string_pretty(&args.data)?;
    fs::write(&args.file_path, pretty).map_err(|e| CommandError::from_io(e, &args.file_path))?;
    Ok(json!({ "message": format!("Successfully saved JSON to {}", args.file_path) }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "save_json",
        typed(save_json),
        json!({
            "type": "function",
            "function": {
                "name": "save_json",
                "description": "Save data as JSON to a file",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to save to" },
                        "data": { "type": "object", "description": "Data to save as JSON" }
                    },
                    "required": ["file_path", "data"]
                }
            }
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_pretty_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/data.json");

        save_json(Args {
            file_path: path.to_string_lossy().into_owned(),
            data: json!({ "name": "agent", "tags": ["a"] }),
        })
        .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"name\": \"agent\""));
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["tags"], json!(["a"]));
    }
}

// crates/host/src/commands/file_ops/write_file.rs

use std::fs;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

use super::ensure_parent;

pub const MODULE: CommandModule = CommandModule {
    name: "write_file",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    file_path: String,
    content: String,
}

fn write_file(args: Args) -> CommandResult {
    ensure_parent(&args.file_path)?;
    fs::write(&args.file_path, &args.content)
        .map_err(|e| CommandError::from_io(e, &args.file_path))?;
    Ok(json!({
        "message": format!("Successfully wrote to {}", args.file_path),
        "bytes_written": args.content.len(),
    }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "write_file",
        typed(write_file),
        json!({
            "type": "function",
            "function": {
                "name": "write_file",
                "description": "Write content to a file (overwrites existing content)",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to write to" },
                        "content": { "type": "string", "description": "Content to write to the file" }
                    },
                    "required": ["file_path", "content"]
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
    fn test_write_creates_parent_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.txt");
        let file_path = path.to_string_lossy().into_owned();

        write_file(Args {
            file_path: file_path.clone(),
            content: "first".into(),
        })
        .unwrap();
        let out = write_file(Args {
            file_path,
            content: "second".into(),
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(out["bytes_written"], json!(6));
    }
}

// crates/host/src/commands/file_ops/list_directory.rs

use std::fs;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

pub const MODULE: CommandModule = CommandModule {
    name: "list_directory",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    #[serde(default = "default_directory")]
    directory_path: String,
}

fn default_directory() -> String {
    ".".to_string()
}

fn list_directory(args: Args) -> CommandResult {
    let entries = fs::read_dir(&args.directory_path)
        .map_err(|e| CommandError::from_io(e, &args.directory_path))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CommandError::from_io(e, &args.directory_path))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    Ok(json!({ "directory_path": args.directory_path, "entries": names }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "list_directory",
        typed(list_directory),
        json!({
            "type": "function",
            "function": {
                "name": "list_directory",
                "description": "List the contents of a directory",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "directory_path": {
                            "type": "string",
                            "description": "Path to the directory to list (defaults to current directory)"
                        }
                    },
                    "required": []
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
    fn test_entries_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.txt", "a.txt", "c"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let out = list_directory(Args {
            directory_path: dir.path().to_string_lossy().into_owned(),
        })
        .unwrap();
        assert_eq!(out["entries"], json!(["a.txt", "b.txt", "c"]));
    }

    #[test]
    fn test_missing_directory() {
        let err = list_directory(Args {
            directory_path: "/definitely/not/here".into(),
        })
        .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}

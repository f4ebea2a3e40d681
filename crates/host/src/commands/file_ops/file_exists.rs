// crates/host/src/commands/file_ops/file_exists.rs

use std::path::Path;

use agent_commands_core::{typed, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

pub const MODULE: CommandModule = CommandModule {
    name: "file_exists",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    file_path: String,
}

fn file_exists(args: Args) -> CommandResult {
    let path = Path::new(&args.file_path);
    Ok(json!({
        "file_path": args.file_path,
        "exists": path.exists(),
        "is_dir": path.is_dir(),
    }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "file_exists",
        typed(file_exists),
        json!({
            "type": "function",
            "function": {
                "name": "file_exists",
                "description": "Check if a file exists",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to check" }
                    },
                    "required": ["file_path"]
                }
            }
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_commands_core::command::args;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_reports_files_dirs_and_missing_paths() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs::write(&file, "x").unwrap();
        let check = |path: &Path| typed(file_exists)(&args(json!({ "file_path": path.to_str().unwrap() })));

        let out = check(&file);
        assert_eq!(out["exists"], json!(true));
        assert_eq!(out["is_dir"], json!(false));

        let out = check(dir.path());
        assert_eq!(out["exists"], json!(true));
        assert_eq!(out["is_dir"], json!(true));

        let out = check(&dir.path().join("missing.txt"));
        assert_eq!(out["exists"], json!(false));
        assert_eq!(out["success"], json!(true));
    }
}

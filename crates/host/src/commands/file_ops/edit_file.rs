// crates/host/src/commands/file_ops/edit_file.rs

use std::fs;
use std::path::Path;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

use super::append_file::append;

pub const MODULE: CommandModule = CommandModule {
    name: "edit_file",
    module_path: module_path!(),
    load,
};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum EditType {
    #[default]
    Replace,
    Append,
}

#[derive(Deserialize)]
struct Args {
    file_path: String,
    content: String,
    #[serde(default)]
    edit_type: EditType,
}

fn edit_file(args: Args) -> CommandResult {
    if !Path::new(&args.file_path).is_file() {
        return Err(CommandError::NotFound(format!(
            "file {} does not exist",
            args.file_path
        )));
    }

    match args.edit_type {
        EditType::Replace => fs::write(&args.file_path, &args.content)
            .map_err(|e| CommandError::from_io(e, &args.file_path))?,
        EditType::Append => append(&args.file_path, &args.content)?,
    }

    let operation = match args.edit_type {
        EditType::Replace => "replace",
        EditType::Append => "append",
    };
    Ok(json!({
        "message": format!("Successfully edited {} with operation: {}", args.file_path, operation),
        "edit_type": operation,
    }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "edit_file",
        typed(edit_file),
        json!({
            "type": "function",
            "function": {
                "name": "edit_file",
                "description": "Edit a file with various operations (replace entire content or append)",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to edit" },
                        "content": { "type": "string", "description": "New content or content to insert" },
                        "edit_type": {
                            "type": "string",
                            "description": "Type of edit operation",
                            "enum": ["replace", "append"],
                            "default": "replace"
                        }
                    },
                    "required": ["file_path", "content"]
                }
            }
        }),
    )?;
    Ok(())
}

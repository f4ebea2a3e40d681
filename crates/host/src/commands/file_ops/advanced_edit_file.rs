// crates/host/src/commands/file_ops/advanced_edit_file.rs

//! Line-addressed edits applied in order. The file is written once, after
//! every operation succeeded.

use std::fs;
use std::path::Path;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

pub const MODULE: CommandModule = CommandModule {
    name: "advanced_edit_file",
    module_path: module_path!(),
    load,
};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LineOp {
    InsertLine,
    ReplaceLine,
    DeleteLine,
}

#[derive(Debug, Deserialize)]
struct EditOperation {
    operation: LineOp,
    /// 1-based.
    line_number: i64,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct Args {
    file_path: String,
    edit_operations: Vec<EditOperation>,
}

fn advanced_edit_file(args: Args) -> CommandResult {
    if !Path::new(&args.file_path).is_file() {
        return Err(CommandError::NotFound(format!(
            "file {} does not exist",
            args.file_path
        )));
    }
    let original =
        fs::read_to_string(&args.file_path).map_err(|e| CommandError::from_io(e, &args.file_path))?;

    let edited = apply_operations(&original, &args.edit_operations)?;
    fs::write(&args.file_path, edited).map_err(|e| CommandError::from_io(e, &args.file_path))?;

    Ok(json!({
        "message": format!(
            "Successfully applied {} edit operations to {}",
            args.edit_operations.len(),
            args.file_path
        ),
        "operations_applied": args.edit_operations.len(),
    }))
}

/// Lines past the end of the file are padded with empty lines before an
/// operation touches them.
fn apply_operations(text: &str, operations: &[EditOperation]) -> Result<String, CommandError> {
    let mut lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();

    for op in operations {
        if op.line_number < 1 {
            return Err(CommandError::invalid(format!(
                "invalid line number {}",
                op.line_number
            )));
        }
        let idx = (op.line_number - 1) as usize;
        while lines.len() <= idx {
            lines.push("\n".to_string());
        }

        match op.operation {
            LineOp::InsertLine => lines.insert(idx, with_newline(&op.content)),
            LineOp::ReplaceLine => lines[idx] = with_newline(&op.content),
            LineOp::DeleteLine => {
                lines.remove(idx);
            }
        }
    }
    Ok(lines.concat())
}

fn with_newline(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{}\n", content)
    }
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "advanced_edit_file",
        typed(advanced_edit_file),
        json!({
            "type": "function",
            "function": {
                "name": "advanced_edit_file",
                "description": "Perform multiple line-specific edit operations on a file",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "file_path": { "type": "string", "description": "Path to the file to edit" },
                        "edit_operations": {
                            "type": "array",
                            "description": "List of edit operations to perform",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "operation": {
                                        "type": "string",
                                        "description": "Type of operation",
                                        "enum": ["insert_line", "replace_line", "delete_line"]
                                    },
                                    "line_number": {
                                        "type": "integer",
                                        "description": "Line number to operate on (1-based)"
                                    },
                                    "content": {
                                        "type": "string",
                                        "description": "Content to insert or replace (not needed for delete)"
                                    }
                                },
                                "required": ["operation", "line_number"]
                            }
                        }
                    },
                    "required": ["file_path", "edit_operations"]
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
    use tempfile::tempdir;

    fn op(operation: LineOp, line_number: i64, content: &str) -> EditOperation {
        EditOperation {
            operation,
            line_number,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_operations_apply_in_order() {
        let edited = apply_operations(
            "one\ntwo\nthree\n",
            &[
                op(LineOp::ReplaceLine, 2, "TWO"),
                op(LineOp::InsertLine, 1, "zero"),
                op(LineOp::DeleteLine, 4, ""),
            ],
        )
        .unwrap();
        assert_eq!(edited, "zero\none\nTWO\n");
    }

    #[test]
    fn test_lines_past_end_are_padded() {
        let edited = apply_operations("a\n", &[op(LineOp::ReplaceLine, 3, "c")]).unwrap();
        assert_eq!(edited, "a\n\nc\n");
    }

    #[test]
    fn test_zero_line_number_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "keep\n").unwrap();

        let out = typed(advanced_edit_file)(&args(json!({
            "file_path": path.to_str().unwrap(),
            "edit_operations": [
                { "operation": "replace_line", "line_number": 1, "content": "changed" },
                { "operation": "delete_line", "line_number": 0 }
            ]
        })));
        assert_eq!(out["error_kind"], json!("invalid_argument"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep\n");
    }

    #[test]
    fn test_edits_file_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "fn main() {\n}\n").unwrap();

        let out = typed(advanced_edit_file)(&args(json!({
            "file_path": path.to_str().unwrap(),
            "edit_operations": [
                { "operation": "insert_line", "line_number": 2, "content": "    println!(\"hi\");" }
            ]
        })));
        assert_eq!(out["success"], json!(true));
        assert_eq!(out["operations_applied"], json!(1));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "fn main() {\n    println!(\"hi\");\n}\n"
        );
    }

    #[test]
    fn test_unknown_operation_and_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let f = typed(advanced_edit_file);

        let out = f(&args(json!({ "file_path": path.to_str().unwrap(), "edit_operations": [] })));
        assert_eq!(out["error_kind"], json!("not_found"));

        fs::write(&path, "x\n").unwrap();
        let out = f(&args(json!({
            "file_path": path.to_str().unwrap(),
            "edit_operations": [{ "operation": "swap_line", "line_number": 1 }]
        })));
        assert_eq!(out["error_kind"], json!("invalid_argument"));
    }
}

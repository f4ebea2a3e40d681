// crates/host/src/commands/github_ops/github_add_files.rs

//! Commit several files to a branch as one commit through the git data API:
//! blobs, then a tree on top of the branch tip, then the commit, then the ref.

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{branch_head, branch_or_default, writer};
use crate::commands::common::{parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_add_files",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct FileSpec {
    path: String,
    content: String,
}

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    files: Vec<FileSpec>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default = "default_commit_message")]
    commit_message: String,
    #[serde(default)]
    base64_encoded: bool,
}

fn default_commit_message() -> String {
    "Added files via agent".to_string()
}

fn github_add_files(args: Args) -> CommandResult {
    add_files(&writer()?, args)
}

fn add_files(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    if args.files.is_empty() {
        return Err(CommandError::invalid("files must not be empty"));
    }
    let repo_path = format!("repos/{}/{}", owner, repo);

    let branch = branch_or_default(github, &repo_path, args.branch)?;
    let parent = branch_head(github, &repo_path, &branch)?;
    let parent_commit = github.get(&format!("{}/git/commits/{}", repo_path, parent))?;

    let mut tree = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let content = blob_content(&file.content, args.base64_encoded)
            .map_err(|err| CommandError::invalid(format!("file {}: {}", file.path, err)))?;
        let blob = github.post(
            &format!("{}/git/blobs", repo_path),
            &json!({ "content": content, "encoding": "base64" }),
        )?;
        tree.push(json!({
            "path": file.path,
            "mode": "100644",
            "type": "blob",
            "sha": blob["sha"],
        }));
    }

    let new_tree = github.post(
        &format!("{}/git/trees", repo_path),
        &json!({ "base_tree": parent_commit["tree"]["sha"], "tree": tree }),
    )?;
    let commit = github.post(
        &format!("{}/git/commits", repo_path),
        &json!({
            "message": args.commit_message,
            "tree": new_tree["sha"],
            "parents": [parent],
        }),
    )?;
    github.patch(
        &format!("{}/git/refs/heads/{}", repo_path, branch),
        &json!({ "sha": commit["sha"] }),
    )?;
    info!(repo = %repo_path, branch = %branch, files = args.files.len(), "Committed files");

    Ok(json!({
        "commit_sha": commit["sha"],
        "commit_url": commit["html_url"],
        "commit_message": args.commit_message,
        "branch": branch,
        "files_added": args.files.len(),
        "repo_url": args.repo_url,
    }))
}

/// Blob payload in base64. Pre-encoded content is checked, not re-encoded.
fn blob_content(content: &str, already_encoded: bool) -> Result<String, String> {
    let engine = base64::engine::general_purpose::STANDARD;
    if !already_encoded {
        return Ok(engine.encode(content));
    }
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    engine
        .decode(&compact)
        .map(|_| compact)
        .map_err(|e| format!("content is not valid base64: {}", e))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_add_files",
        typed(github_add_files),
        json!({
            "type": "function",
            "function": {
                "name": "github_add_files",
                "description": "Add or update files in a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "files": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "path": {
                                        "type": "string",
                                        "description": "Path where the file should be created/updated"
                                    },
                                    "content": {
                                        "type": "string",
                                        "description": "Content of the file (can be base64 encoded if base64_encoded is true)"
                                    }
                                },
                                "required": ["path", "content"]
                            },
                            "description": "List of files to add/update"
                        },
                        "branch": {
                            "type": "string",
                            "description": "Branch to commit to (defaults to repository's default branch)"
                        },
                        "commit_message": {
                            "type": "string",
                            "description": "Commit message for the changes",
                            "default": "Added files via agent"
                        },
                        "base64_encoded": {
                            "type": "boolean",
                            "description": "Whether the file contents are base64 encoded",
                            "default": false
                        }
                    },
                    "required": ["repo_url", "files"]
                }
            }
        }),
    )?;
    Ok(())
}

// crates/host/src/commands/github_ops/github_read_files.rs

//! File contents of a pull request at its head commit.

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use super::decode_contents;
use super::pr_reader::changes_summary;
use crate::commands::common::{parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_read_files",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    pr_number: u64,
    #[serde(default)]
    file_filter: Option<String>,
    #[serde(default = "default_max_files")]
    max_files: usize,
}

fn default_max_files() -> usize {
    10
}

fn github_read_files(args: Args) -> CommandResult {
    read_files(&GitHub::from_env()?, args)
}

fn read_files(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let filter = filename_filter(args.file_filter.as_deref())?;
    let repo_path = format!("repos/{}/{}", owner, repo);

    let pr = github.get(&format!("{}/pulls/{}", repo_path, args.pr_number))?;
    let head_sha = pr["head"]["sha"].as_str().unwrap_or_default().to_string();
    let listed = github.get_with(
        &format!("{}/pulls/{}/files", repo_path, args.pr_number),
        &[("per_page", "100".to_string())],
    )?;

    let mut files = Vec::new();
    for raw in listed.as_array().into_iter().flatten() {
        if files.len() >= args.max_files {
            break;
        }
        let filename = raw["filename"].as_str().unwrap_or_default();
        if filter.as_ref().is_some_and(|re| !re.is_match(filename)) {
            continue;
        }

        let mut file = json!({
            "filename": filename,
            "status": raw["status"],
            "sha": raw["sha"],
            "additions": raw["additions"],
            "deletions": raw["deletions"],
            "changes": raw["changes"],
            "raw_url": raw["raw_url"],
            "blob_url": raw["blob_url"],
            "contents_url": raw["contents_url"],
            "patch": raw["patch"],
            "previous_filename": raw["previous_filename"],
        });
        if raw["status"] != "removed" {
            match fetch_content(github, &repo_path, filename, &head_sha) {
                Ok(text) => file["content"] = json!(text),
                Err(err) => {
                    file["content"] = Value::Null;
                    file["content_error"] = json!(err.to_string());
                }
            }
        }
        files.push(file);
    }

    let mut summary = changes_summary(&files);
    if let Some(obj) = summary.as_object_mut() {
        obj.remove("total_files");
        obj.insert("files_included".to_string(), json!(files.len()));
    }

    Ok(json!({
        "pr_number": args.pr_number,
        "pr_title": pr["title"],
        "total_files": pr["changed_files"],
        "files": files,
        "summary": summary,
    }))
}

/// Filters match from the start of the filename.
fn filename_filter(pattern: Option<&str>) -> Result<Option<Regex>, CommandError> {
    let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    Regex::new(&format!("^(?:{})", pattern))
        .map(Some)
        .map_err(|e| CommandError::invalid(format!("invalid file_filter: {}", e)))
}

fn fetch_content(
    github: &GitHub,
    repo_path: &str,
    filename: &str,
    sha: &str,
) -> Result<String, CommandError> {
    let encoded_path = filename
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    let contents = github.get_with(
        &format!("{}/contents/{}", repo_path, encoded_path),
        &[("ref", sha.to_string())],
    )?;
    decode_contents(&contents)
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_read_files",
        typed(github_read_files),
        json!({
            "type": "function",
            "function": {
                "name": "github_read_files",
                "description": "Read file contents from a GitHub pull request",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "pr_number": { "type": "integer", "description": "The PR number to fetch files from" },
                        "file_filter": {
                            "type": "string",
                            "description": "Optional regex matched against the start of each filename (e.g. 'src/.*\\.rs$')"
                        },
                        "max_files": {
                            "type": "integer",
                            "description": "Maximum number of files to fetch",
                            "default": 10
                        }
                    },
                    "required": ["repo_url", "pr_number"]
                }
            }
        }),
    )?;
    Ok(())
}

// crates/host/src/commands/github_ops/mod.rs

//! GitHub REST commands. Reads work anonymously (rate limited); writes need
//! GITHUB_TOKEN.

pub mod github_add_files;
pub mod github_approve_pr;
pub mod github_close_pr;
pub mod github_comment;
pub mod github_create_branch;
pub mod github_create_issue;
pub mod github_create_pr;
pub mod github_create_repo;
pub mod github_merge_pr;
pub mod github_read_files;
pub mod github_reopen_pr;
pub mod github_repo_search;
pub mod issue_reader;
pub mod pr_reader;
pub mod repo_reader;

use agent_commands_core::{CategoryModule, CommandError};
use base64::Engine as _;
use serde_json::{json, Value};
use tracing::warn;

use crate::commands::common::GitHub;

pub fn category() -> CategoryModule {
    CategoryModule::new(
        "github_ops",
        vec![
            repo_reader::MODULE,
            issue_reader::MODULE,
            pr_reader::MODULE,
            github_read_files::MODULE,
            github_create_issue::MODULE,
            github_comment::MODULE,
            github_repo_search::MODULE,
            github_create_branch::MODULE,
            github_add_files::MODULE,
            github_create_pr::MODULE,
            github_merge_pr::MODULE,
            github_close_pr::MODULE,
            github_reopen_pr::MODULE,
            github_approve_pr::MODULE,
            github_create_repo::MODULE,
        ],
    )
}

/// Bodies typed by an LLM often carry a literal backslash-n instead of a newline.
fn expand_newlines(text: &str) -> String {
    text.replace("\\n", "\n").trim().to_string()
}

/// Client for write commands, which all need a token.
fn writer() -> Result<GitHub, CommandError> {
    let github = GitHub::from_env()?;
    github.require_token()?;
    Ok(github)
}

/// Turn a 404 from GitHub into [`CommandError::NotFound`] with `message`.
fn not_found(err: CommandError, message: String) -> CommandError {
    match err {
        CommandError::RemoteApi { status: 404, .. } => CommandError::NotFound(message),
        other => other,
    }
}

fn get_pull(github: &GitHub, repo_path: &str, number: u64) -> Result<Value, CommandError> {
    github
        .get(&format!("{}/pulls/{}", repo_path, number))
        .map_err(|err| not_found(err, format!("could not find PR #{}", number)))
}

/// `branch`, or the repository's default branch when none was given.
fn branch_or_default(
    github: &GitHub,
    repo_path: &str,
    branch: Option<String>,
) -> Result<String, CommandError> {
    if let Some(branch) = branch.filter(|b| !b.trim().is_empty()) {
        return Ok(branch);
    }
    let repo = github.get(repo_path)?;
    repo["default_branch"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CommandError::NotFound(format!("{} has no default branch", repo_path)))
}

/// Commit SHA at the tip of `branch`.
fn branch_head(github: &GitHub, repo_path: &str, branch: &str) -> Result<String, CommandError> {
    let reference = github
        .get(&format!("{}/git/ref/heads/{}", repo_path, branch))
        .map_err(|err| not_found(err, format!("branch '{}' not found", branch)))?;
    reference["object"]["sha"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CommandError::NotFound(format!("branch '{}' has no commit", branch)))
}

/// Leave an optional comment, then PATCH the pull request to `state`. A
/// failed comment is logged and reported as `false` without blocking the
/// state change.
fn comment_then_set_state(
    github: &GitHub,
    repo_path: &str,
    number: u64,
    comment: Option<&str>,
    state: &str,
) -> Result<(Value, bool), CommandError> {
    let comment = comment.map(expand_newlines).filter(|c| !c.is_empty());
    let commented = match comment {
        Some(body) => match github.post(
            &format!("{}/issues/{}/comments", repo_path, number),
            &json!({ "body": body }),
        ) {
            Ok(_) => true,
            Err(err) => {
                warn!(pr = number, error = %err, "Could not comment on pull request");
                false
            }
        },
        None => false,
    };
    let pr = github.patch(
        &format!("{}/pulls/{}", repo_path, number),
        &json!({ "state": state }),
    )?;
    Ok((pr, commented))
}

/// Decode a contents API object. The payload is base64 with embedded line
/// breaks.
fn decode_contents(contents: &Value) -> Result<String, CommandError> {
    let encoded: String = contents["content"]
        .as_str()
        .ok_or_else(|| CommandError::invalid("contents response has no content"))?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| CommandError::invalid(format!("content is not valid base64: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_newlines() {
        assert_eq!(expand_newlines("  a\\nb\n"), "a\nb");
        assert_eq!(expand_newlines("plain"), "plain");
    }

    #[test]
    fn test_decode_contents_with_line_breaks() {
        let readme = json!({ "content": "IyBDYXJn\nbwo=\n", "encoding": "base64" });
        assert_eq!(decode_contents(&readme).unwrap(), "# Cargo\n");

        let err = decode_contents(&json!({ "content": "!!!" })).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert!(decode_contents(&json!({})).is_err());
    }
}

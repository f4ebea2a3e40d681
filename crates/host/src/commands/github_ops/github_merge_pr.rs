// crates/host/src/commands/github_ops/github_merge_pr.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{get_pull, writer};
use crate::commands::common::{parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_merge_pr",
    module_path: module_path!(),
    load,
};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MergeMethod {
    #[default]
    Merge,
    Squash,
    Rebase,
}

impl MergeMethod {
    fn as_str(self) -> &'static str {
        match self {
            MergeMethod::Merge => "merge",
            MergeMethod::Squash => "squash",
            MergeMethod::Rebase => "rebase",
        }
    }
}

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    pr_number: u64,
    #[serde(default)]
    merge_method: MergeMethod,
    #[serde(default)]
    commit_title: Option<String>,
    #[serde(default)]
    commit_message: Option<String>,
    #[serde(default)]
    delete_branch: bool,
}

fn github_merge_pr(args: Args) -> CommandResult {
    merge_pr(&writer()?, args)
}

fn merge_pr(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let repo_path = format!("repos/{}/{}", owner, repo);

    let pr = get_pull(github, &repo_path, args.pr_number)?;
    check_mergeable(&pr)?;

    let mut body = json!({ "merge_method": args.merge_method.as_str() });
    if let Some(title) = &args.commit_title {
        body["commit_title"] = json!(title);
    }
    if let Some(message) = &args.commit_message {
        body["commit_message"] = json!(message);
    }
    let merge = github.put(&format!("{}/pulls/{}/merge", repo_path, args.pr_number), &body)?;
    info!(repo = %repo_path, number = args.pr_number, method = args.merge_method.as_str(), "Merged pull request");

    let head_branch = pr["head"]["ref"].as_str().unwrap_or_default();
    let mut result = json!({
        "merged": merge["merged"],
        "message": merge["message"],
        "sha": merge["sha"],
        "merge_method": args.merge_method.as_str(),
        "pr_number": args.pr_number,
        "pr_url": pr["html_url"],
        "pr_title": pr["title"],
        "head_branch": head_branch,
        "base_branch": pr["base"]["ref"],
        "repo_url": args.repo_url,
    });

    if args.delete_branch && merge["merged"] == true {
        match github.delete(&format!("{}/git/refs/heads/{}", repo_path, head_branch)) {
            Ok(()) => result["branch_deleted"] = json!(true),
            Err(err) => {
                warn!(branch = head_branch, error = %err, "Merged but could not delete head branch");
                result["branch_deleted"] = json!(false);
                result["branch_delete_error"] = json!(err.to_string());
            }
        }
    }
    Ok(result)
}

/// GitHub computes `mergeable` lazily; a null value means "ask again later".
fn check_mergeable(pr: &Value) -> Result<(), CommandError> {
    if pr["merged"] == true {
        return Err(CommandError::invalid("pull request is already merged"));
    }
    if pr["state"] == "closed" {
        return Err(CommandError::invalid("pull request is closed but not merged"));
    }
    match pr["mergeable"].as_bool() {
        Some(true) => Ok(()),
        Some(false) => Err(CommandError::invalid(format!(
            "pull request is not mergeable (state: {})",
            pr["mergeable_state"].as_str().unwrap_or("unknown")
        ))),
        None => Err(CommandError::Unavailable(
            "GitHub is still computing whether this PR is mergeable; try again in a few seconds"
                .to_string(),
        )),
    }
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_merge_pr",
        typed(github_merge_pr),
        json!({
            "type": "function",
            "function": {
                "name": "github_merge_pr",
                "description": "Merge a pull request in a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "pr_number": { "type": "integer", "description": "The number of the pull request to merge" },
                        "merge_method": {
                            "type": "string",
                            "description": "Method to use for the merge (merge, squash, or rebase)",
                            "enum": ["merge", "squash", "rebase"],
                            "default": "merge"
                        },
                        "commit_title": {
                            "type": "string",
                            "description": "Optional title for the merge commit (default: PR title)"
                        },
                        "commit_message": {
                            "type": "string",
                            "description": "Optional message for the merge commit (default: PR body)"
                        },
                        "delete_branch": {
                            "type": "boolean",
                            "description": "Whether to delete the head branch after merging",
                            "default": false
                        }
                    },
                    "required": ["repo_url", "pr_number"]
                }
            }
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_http::TestServer;

    fn merge_args(delete_branch: bool) -> Args {
        Args {
            repo_url: "o/r".into(),
            pr_number: 3,
            merge_method: MergeMethod::Squash,
            commit_title: Some("Squashed".into()),
            commit_message: None,
            delete_branch,
        }
    }

    #[test]
    fn test_check_mergeable_states() {
        let err = check_mergeable(&json!({ "merged": true, "state": "closed" })).unwrap_err();
        assert!(err.to_string().contains("already merged"));
        let err = check_mergeable(&json!({ "merged": false, "state": "closed" })).unwrap_err();
        assert!(err.to_string().contains("closed but not merged"));
        let err = check_mergeable(&json!({ "state": "open", "mergeable": null })).unwrap_err();
        assert_eq!(err.kind(), "unavailable");
        let err = check_mergeable(&json!({
            "state": "open",
            "mergeable": false,
            "mergeable_state": "dirty"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("dirty"));
        assert!(check_mergeable(&json!({ "state": "open", "mergeable": true })).is_ok());
    }

    #[test]
    fn test_squash_merge_and_delete_branch() {
        let server = TestServer::start(vec![
            (200, r#"{"state":"open","merged":false,"mergeable":true,"head":{"ref":"topic"},"base":{"ref":"main"}}"#),
            (200, r#"{"merged":true,"sha":"m1","message":"Pull Request successfully merged"}"#),
            (204, ""),
        ]);
        let github = GitHub::new(&server.url, Some("t".into())).unwrap();

        let out = merge_pr(&github, merge_args(true)).unwrap();
        assert_eq!(out["merged"], json!(true));
        assert_eq!(out["sha"], json!("m1"));
        assert_eq!(out["branch_deleted"], json!(true));

        let requests = server.finish();
        assert_eq!(requests[1].line, "PUT /repos/o/r/pulls/3/merge");
        let sent: Value = serde_json::from_str(&requests[1].body).unwrap();
        assert_eq!(sent, json!({ "merge_method": "squash", "commit_title": "Squashed" }));
        assert_eq!(requests[2].line, "DELETE /repos/o/r/git/refs/heads/topic");
    }

    #[test]
    fn test_closed_pr_is_not_merged() {
        let server = TestServer::start(vec![(200, r#"{"state":"closed","merged":false}"#)]);
        let github = GitHub::new(&server.url, Some("t".into())).unwrap();

        let err = merge_pr(&github, merge_args(false)).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
        assert_eq!(server.finish().len(), 1);
    }
}

// crates/host/src/commands/github_ops/pr_reader.rs

use std::collections::BTreeMap;

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};

use super::issue_reader::{comment_summary, labels, IssueState};
use crate::commands::common::{login, parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "pr_reader",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    #[serde(default)]
    pr_number: Option<u64>,
    #[serde(default)]
    state: IssueState,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    include_files: bool,
    #[serde(default)]
    include_comments: bool,
    #[serde(default)]
    include_review_comments: bool,
}

fn default_limit() -> usize {
    10
}

fn pr_reader(args: Args) -> CommandResult {
    read_pulls(&GitHub::from_env()?, args)
}

fn read_pulls(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let repo_path = format!("repos/{}/{}", owner, repo);

    if let Some(number) = args.pr_number {
        let raw = github.get(&format!("{}/pulls/{}", repo_path, number))?;
        let mut pr = pr_detail(&raw);
        attach_discussion(github, &repo_path, &raw, &args, &mut pr)?;
        if args.include_files {
            let files = github.get_with(
                &format!("{}/pulls/{}/files", repo_path, number),
                &[("per_page", "100".to_string())],
            )?;
            let changes: Vec<Value> = files.as_array().into_iter().flatten().map(file_change).collect();
            pr["file_changes_summary"] = changes_summary(&changes);
            pr["file_changes"] = json!(changes);
        }
        return Ok(json!({ "pull_request": pr }));
    }

    if args.limit == 0 {
        return Err(CommandError::invalid("limit must be at least 1"));
    }
    let raw = github.get_with(
        &format!("{}/pulls", repo_path),
        &[
            ("state", args.state.as_str().to_string()),
            ("sort", "updated".to_string()),
            ("direction", "desc".to_string()),
            ("per_page", args.limit.min(100).to_string()),
        ],
    )?;
    let mut pulls = Vec::new();
    for item in raw.as_array().into_iter().flatten().take(args.limit) {
        let mut pr = pr_summary(item);
        attach_discussion(github, &repo_path, item, &args, &mut pr)?;
        pulls.push(pr);
    }

    Ok(json!({
        "total_count": pulls.len(),
        "state": args.state.as_str(),
        "pull_requests": pulls,
    }))
}

fn pr_summary(raw: &Value) -> Value {
    json!({
        "number": raw["number"],
        "title": raw["title"],
        "state": raw["state"],
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "comments_count": raw["comments"],
        "review_comments_count": raw["review_comments"],
        "commits": raw["commits"],
        "changed_files": raw["changed_files"],
        "labels": labels(raw),
        "url": raw["html_url"],
        "base": raw["base"]["ref"],
        "head": raw["head"]["ref"],
        "author": login(&raw["user"]),
        "draft": raw["draft"],
    })
}

fn pr_detail(raw: &Value) -> Value {
    let mut pr = pr_summary(raw);
    for key in ["body", "additions", "deletions", "mergeable", "merged", "maintainer_can_modify"] {
        pr[key] = raw[key].clone();
    }
    pr["assignees"] = json!(raw["assignees"]
        .as_array()
        .map(|a| a.iter().map(login).collect::<Vec<_>>())
        .unwrap_or_default());
    pr
}

/// Counts missing from list responses are treated as "maybe some".
fn may_have(raw: &Value, count_key: &str) -> bool {
    raw[count_key].as_u64().map_or(true, |n| n > 0)
}

fn attach_discussion(
    github: &GitHub,
    repo_path: &str,
    raw: &Value,
    args: &Args,
    pr: &mut Value,
) -> Result<(), CommandError> {
    let number = &raw["number"];
    if args.include_comments && may_have(raw, "comments") {
        let comments = github.get(&format!("{}/issues/{}/comments", repo_path, number))?;
        pr["comments"] = json!(comments
            .as_array()
            .into_iter()
            .flatten()
            .map(comment_summary)
            .collect::<Vec<_>>());
    }
    if args.include_review_comments && may_have(raw, "review_comments") {
        let comments = github.get(&format!("{}/pulls/{}/comments", repo_path, number))?;
        pr["review_comments"] = json!(comments
            .as_array()
            .into_iter()
            .flatten()
            .map(review_comment)
            .collect::<Vec<_>>());
    }
    Ok(())
}

fn review_comment(raw: &Value) -> Value {
    let mut comment = comment_summary(raw);
    for key in ["path", "position", "original_position", "commit_id", "diff_hunk"] {
        comment[key] = raw[key].clone();
    }
    comment
}

fn file_change(raw: &Value) -> Value {
    json!({
        "filename": raw["filename"],
        "status": raw["status"],
        "additions": raw["additions"],
        "deletions": raw["deletions"],
        "changes": raw["changes"],
        "raw_url": raw["raw_url"],
        "blob_url": raw["blob_url"],
        "sha": raw["sha"],
        "previous_filename": raw["previous_filename"],
        "patch": raw["patch"],
    })
}

pub(super) fn changes_summary(changes: &[Value]) -> Value {
    let total = |key: &str| changes.iter().filter_map(|c| c[key].as_u64()).sum::<u64>();
    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    for change in changes {
        let status = change["status"].as_str().unwrap_or("unknown").to_string();
        *by_status.entry(status).or_default() += 1;
    }
    json!({
        "total_files": changes.len(),
        "files_by_status": by_status,
        "total_additions": total("additions"),
        "total_deletions": total("deletions"),
        "total_changes": total("changes"),
    })
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_pr_reader",
        typed(pr_reader),
        json!({
            "type": "function",
            "function": {
                "name": "github_pr_reader",
                "description": "Read one pull request, or list pull requests, from a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "pr_number": {
                            "type": "integer",
                            "description": "Specific PR number to fetch (optional)"
                        },
                        "state": {
                            "type": "string",
                            "description": "PR state to fetch ('open', 'closed', or 'all')",
                            "enum": ["open", "closed", "all"],
                            "default": "open"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of PRs to fetch when not specifying a PR number",
                            "default": 10
                        },
                        "include_files": {
                            "type": "boolean",
                            "description": "Whether to include file changes (only for specific PR)",
                            "default": false
                        },
                        "include_comments": {
                            "type": "boolean",
                            "description": "Whether to include regular comments on the PR",
                            "default": false
                        },
                        "include_review_comments": {
                            "type": "boolean",
                            "description": "Whether to include review comments on specific lines of code",
                            "default": false
                        }
                    },
                    "required": ["repo_url"]
                }
            }
        }),
    )?;
    Ok(())
}

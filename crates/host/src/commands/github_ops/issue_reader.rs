// crates/host/src/commands/github_ops/issue_reader.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::commands::common::{login, parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "issue_reader",
    module_path: module_path!(),
    load,
};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(super) enum IssueState {
    #[default]
    Open,
    Closed,
    All,
}

impl IssueState {
    pub(super) fn as_str(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    #[serde(default)]
    issue_number: Option<u64>,
    #[serde(default)]
    state: IssueState,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    include_comments: bool,
}

fn default_limit() -> usize {
    10
}

fn issue_reader(args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let github = GitHub::from_env()?;
    let base = format!("repos/{}/{}/issues", owner, repo);

    if let Some(number) = args.issue_number {
        let raw = github.get(&format!("{}/{}", base, number))?;
        let mut issue = issue_detail(&raw);
        if args.include_comments {
            attach_comments(&github, &base, &raw, &mut issue)?;
        }
        return Ok(json!({ "issue": issue }));
    }

    if args.limit == 0 {
        return Err(CommandError::invalid("limit must be at least 1"));
    }
    let raw = github.get_with(
        &base,
        &[
            ("state", args.state.as_str().to_string()),
            ("per_page", args.limit.min(100).to_string()),
        ],
    )?;
    let mut issues = Vec::new();
    for item in raw.as_array().into_iter().flatten().take(args.limit) {
        let mut issue = issue_summary(item);
        if args.include_comments {
            attach_comments(&github, &base, item, &mut issue)?;
        }
        issues.push(issue);
    }

    Ok(json!({
        "total_count": issues.len(),
        "state": args.state.as_str(),
        "issues": issues,
    }))
}

pub(super) fn labels(raw: &Value) -> Vec<Value> {
    raw["labels"]
        .as_array()
        .map(|labels| labels.iter().map(|l| l["name"].clone()).collect())
        .unwrap_or_default()
}

fn issue_summary(raw: &Value) -> Value {
    json!({
        "number": raw["number"],
        "title": raw["title"],
        "state": raw["state"],
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "comments_count": raw["comments"],
        "labels": labels(raw),
        "url": raw["html_url"],
        "author": login(&raw["user"]),
        "is_pull_request": raw.get("pull_request").is_some(),
    })
}

fn issue_detail(raw: &Value) -> Value {
    let mut issue = issue_summary(raw);
    issue["body"] = raw["body"].clone();
    issue["assignees"] = json!(raw["assignees"]
        .as_array()
        .map(|a| a.iter().map(login).collect::<Vec<_>>())
        .unwrap_or_default());
    issue["milestone"] = raw["milestone"]["title"].clone();
    issue["locked"] = raw["locked"].clone();
    issue
}

fn attach_comments(
    github: &GitHub,
    base: &str,
    raw: &Value,
    issue: &mut Value,
) -> Result<(), CommandError> {
    if raw["comments"].as_u64().unwrap_or(0) == 0 {
        return Ok(());
    }
    let number = &raw["number"];
    let comments = github.get(&format!("{}/{}/comments", base, number))?;
    issue["comments"] = json!(comments
        .as_array()
        .into_iter()
        .flatten()
        .map(comment_summary)
        .collect::<Vec<_>>());
    Ok(())
}

pub(super) fn comment_summary(raw: &Value) -> Value {
    json!({
        "id": raw["id"],
        "author": login(&raw["user"]),
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "body": raw["body"],
        "url": raw["html_url"],
    })
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_issue_reader",
        typed(issue_reader),
        json!({
            "type": "function",
            "function": {
                "name": "github_issue_reader",
                "description": "Read one issue, or list issues, from a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "issue_number": {
                            "type": "integer",
                            "description": "Specific issue number to fetch (optional)"
                        },
                        "state": {
                            "type": "string",
                            "description": "Issue state to fetch ('open', 'closed', or 'all')",
                            "enum": ["open", "closed", "all"],
                            "default": "open"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of issues to fetch when not specifying an issue number",
                            "default": 10
                        },
                        "include_comments": {
                            "type": "boolean",
                            "description": "Whether to include all comments for the issue(s)",
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

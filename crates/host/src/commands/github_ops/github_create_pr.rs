// crates/host/src/commands/github_ops/github_create_pr.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{branch_or_default, expand_newlines, writer};
use crate::commands::common::{login, parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_create_pr",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    title: String,
    body: String,
    head_branch: String,
    #[serde(default)]
    base_branch: Option<String>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    assignees: Vec<String>,
    #[serde(default)]
    reviewers: Vec<String>,
    #[serde(default)]
    team_reviewers: Vec<String>,
    #[serde(default = "default_true")]
    maintainer_can_modify: bool,
}

fn default_true() -> bool {
    true
}

fn github_create_pr(args: Args) -> CommandResult {
    create_pr(&writer()?, args)
}

fn create_pr(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    if args.title.trim().is_empty() {
        return Err(CommandError::invalid("title must not be empty"));
    }
    let repo_path = format!("repos/{}/{}", owner, repo);
    let base_branch = branch_or_default(github, &repo_path, args.base_branch.clone())?;

    let mut pr = github.post(
        &format!("{}/pulls", repo_path),
        &json!({
            "title": args.title,
            "body": expand_newlines(&args.body),
            "head": args.head_branch,
            "base": base_branch,
            "draft": args.draft,
            "maintainer_can_modify": args.maintainer_can_modify,
        }),
    )?;
    let number = pr["number"].clone();
    info!(repo = %repo_path, number = %number, "Created pull request");

    if !args.labels.is_empty() {
        let labels = github.post(
            &format!("{}/issues/{}/labels", repo_path, number),
            &json!({ "labels": args.labels }),
        )?;
        pr["labels"] = labels;
    }
    if !args.assignees.is_empty() {
        let issue = github.post(
            &format!("{}/issues/{}/assignees", repo_path, number),
            &json!({ "assignees": args.assignees }),
        )?;
        pr["assignees"] = issue["assignees"].clone();
    }
    if !args.reviewers.is_empty() || !args.team_reviewers.is_empty() {
        let updated = github.post(
            &format!("{}/pulls/{}/requested_reviewers", repo_path, number),
            &json!({ "reviewers": args.reviewers, "team_reviewers": args.team_reviewers }),
        )?;
        pr["requested_reviewers"] = updated["requested_reviewers"].clone();
        pr["requested_teams"] = updated["requested_teams"].clone();
    }

    Ok(json!({
        "pr_number": pr["number"],
        "pr_url": pr["html_url"],
        "created_at": pr["created_at"],
        "author": login(&pr["user"]),
        "title": pr["title"],
        "labels": names(&pr["labels"], "name"),
        "assignees": names(&pr["assignees"], "login"),
        "reviewers": names(&pr["requested_reviewers"], "login"),
        "team_reviewers": names(&pr["requested_teams"], "name"),
        "draft": pr["draft"],
        "head_branch": args.head_branch,
        "base_branch": base_branch,
        "repo_url": args.repo_url,
    }))
}

fn names(list: &Value, key: &str) -> Vec<Value> {
    list.as_array()
        .map(|items| items.iter().map(|item| item[key].clone()).collect())
        .unwrap_or_default()
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    let string_list = |description: &str| {
        json!({ "type": "array", "items": { "type": "string" }, "description": description })
    };
    r.register(
        "github_create_pr",
        typed(github_create_pr),
        json!({
            "type": "function",
            "function": {
                "name": "github_create_pr",
                "description": "Create a pull request in a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "title": { "type": "string", "description": "The title of the pull request" },
                        "body": {
                            "type": "string",
                            "description": "The body text of the pull request (supports markdown). Use \\n for newlines."
                        },
                        "head_branch": {
                            "type": "string",
                            "description": "The name of the branch containing the changes"
                        },
                        "base_branch": {
                            "type": "string",
                            "description": "The name of the branch to merge into (defaults to repository's default branch)"
                        },
                        "draft": {
                            "type": "boolean",
                            "description": "Whether to create the PR as a draft",
                            "default": false
                        },
                        "labels": string_list("Label names to add to the PR"),
                        "assignees": string_list("GitHub usernames to assign"),
                        "reviewers": string_list("Individual reviewers to request"),
                        "team_reviewers": string_list("Team names to request review from"),
                        "maintainer_can_modify": {
                            "type": "boolean",
                            "description": "Whether maintainers can modify the PR's head branch",
                            "default": true
                        }
                    },
                    "required": ["repo_url", "title", "body", "head_branch"]
                }
            }
        }),
    )?;
    Ok(())
}

// crates/host/src/commands/github_ops/github_close_pr.rs

use agent_commands_core::{typed, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

use super::{comment_then_set_state, get_pull, writer};
use crate::commands::common::{parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_close_pr",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    pr_number: u64,
    #[serde(default)]
    comment: Option<String>,
}

fn github_close_pr(args: Args) -> CommandResult {
    close_pr(&writer()?, args)
}

fn close_pr(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let repo_path = format!("repos/{}/{}", owner, repo);

    get_pull(github, &repo_path, args.pr_number)?;
    let (pr, commented) =
        comment_then_set_state(github, &repo_path, args.pr_number, args.comment.as_deref(), "closed")?;

    Ok(json!({
        "pr_number": args.pr_number,
        "pr_url": pr["html_url"],
        "closed_at": pr["closed_at"],
        "commented": commented,
        "state": pr["state"],
        "repo_url": args.repo_url,
    }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_close_pr",
        typed(github_close_pr),
        json!({
            "type": "function",
            "function": {
                "name": "github_close_pr",
                "description": "Close a pull request in a GitHub repository with an optional comment",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "pr_number": { "type": "integer", "description": "The number of the pull request to close" },
                        "comment": {
                            "type": "string",
                            "description": "Optional comment to leave before closing the pull request"
                        }
                    },
                    "required": ["repo_url", "pr_number"]
                }
            }
        }),
    )?;
    Ok(())
}

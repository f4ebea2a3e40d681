// crates/host/src/commands/github_ops/github_reopen_pr.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

use super::{comment_then_set_state, get_pull, writer};
use crate::commands::common::{parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_reopen_pr",
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

fn github_reopen_pr(args: Args) -> CommandResult {
    reopen_pr(&writer()?, args)
}

fn reopen_pr(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let repo_path = format!("repos/{}/{}", owner, repo);

    let current = get_pull(github, &repo_path, args.pr_number)?;
    if current["merged"] == true {
        return Err(CommandError::invalid(
            "pull request is already merged and cannot be reopened",
        ));
    }
    if current["state"] == "open" {
        return Err(CommandError::invalid("pull request is already open"));
    }

    let (pr, commented) =
        comment_then_set_state(github, &repo_path, args.pr_number, args.comment.as_deref(), "open")?;

    Ok(json!({
        "pr_number": args.pr_number,
        "pr_url": pr["html_url"],
        "pr_state": pr["state"],
        "commented": commented,
        "reopened_at": pr["updated_at"],
        "head_branch": pr["head"]["ref"],
        "base_branch": pr["base"]["ref"],
        "repo_url": args.repo_url,
    }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_reopen_pr",
        typed(github_reopen_pr),
        json!({
            "type": "function",
            "function": {
                "name": "github_reopen_pr",
                "description": "Reopen a closed pull request in a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "pr_number": { "type": "integer", "description": "The number of the pull request to reopen" },
                        "comment": {
                            "type": "string",
                            "description": "Optional comment to leave when reopening the pull request"
                        }
                    },
                    "required": ["repo_url", "pr_number"]
                }
            }
        }),
    )?;
    Ok(())
}

// crates/host/src/commands/github_ops/github_create_branch.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{branch_head, branch_or_default, writer};
use crate::commands::common::{parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_create_branch",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    branch_name: String,
    #[serde(default)]
    base_branch: Option<String>,
}

fn github_create_branch(args: Args) -> CommandResult {
    create_branch(&writer()?, args)
}

fn create_branch(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let branch_name = args.branch_name.trim();
    if branch_name.is_empty() {
        return Err(CommandError::invalid("branch_name must not be empty"));
    }
    let repo_path = format!("repos/{}/{}", owner, repo);

    let base_branch = branch_or_default(github, &repo_path, args.base_branch)?;
    let sha = branch_head(github, &repo_path, &base_branch)?;
    github.post(
        &format!("{}/git/refs", repo_path),
        &json!({ "ref": format!("refs/heads/{}", branch_name), "sha": sha }),
    )?;
    info!(repo = %repo_path, branch = branch_name, base = %base_branch, "Created branch");

    Ok(json!({
        "branch_name": branch_name,
        "base_branch": base_branch,
        "sha": sha,
        "repo_url": args.repo_url,
    }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_create_branch",
        typed(github_create_branch),
        json!({
            "type": "function",
            "function": {
                "name": "github_create_branch",
                "description": "Create a new branch in a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "branch_name": { "type": "string", "description": "The name of the new branch" },
                        "base_branch": {
                            "type": "string",
                            "description": "The name of the branch to base from (defaults to repository's default branch)"
                        }
                    },
                    "required": ["repo_url", "branch_name"]
                }
            }
        }),
    )?;
    Ok(())
}

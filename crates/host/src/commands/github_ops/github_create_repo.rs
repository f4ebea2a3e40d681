// crates/host/src/commands/github_ops/github_create_repo.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::writer;
use crate::commands::common::{login, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_create_repo",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    private: bool,
    #[serde(default = "default_true")]
    has_wiki: bool,
    #[serde(default = "default_true")]
    has_issues: bool,
    #[serde(default = "default_true")]
    has_projects: bool,
    #[serde(default = "default_true")]
    auto_init: bool,
    #[serde(default)]
    gitignore_template: Option<String>,
    #[serde(default)]
    license_template: Option<String>,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    team_id: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn github_create_repo(args: Args) -> CommandResult {
    create_repo(&writer()?, args)
}

fn create_repo(github: &GitHub, args: Args) -> CommandResult {
    if args.name.trim().is_empty() {
        return Err(CommandError::invalid("name must not be empty"));
    }
    let organization = args.organization.as_deref().filter(|o| !o.trim().is_empty());
    if args.team_id.is_some() && organization.is_none() {
        return Err(CommandError::invalid("team_id needs an organization"));
    }

    let repo = github.post(
        &match organization {
            Some(org) => format!("orgs/{}/repos", org),
            None => "user/repos".to_string(),
        },
        &create_body(&args),
    )?;
    info!(repo = %repo["full_name"], "Created repository");

    if let Some(team_id) = args.team_id {
        github.put(
            &format!("teams/{}/repos/{}", team_id, repo["full_name"].as_str().unwrap_or_default()),
            &json!({}),
        )?;
    }

    Ok(json!({
        "name": repo["name"],
        "full_name": repo["full_name"],
        "description": repo["description"],
        "private": repo["private"],
        "html_url": repo["html_url"],
        "clone_url": repo["clone_url"],
        "ssh_url": repo["ssh_url"],
        "created_at": repo["created_at"],
        "owner": login(&repo["owner"]),
        "default_branch": repo["default_branch"],
        "organization": organization,
    }))
}

fn create_body(args: &Args) -> Value {
    let mut body = json!({
        "name": args.name.trim(),
        "description": args.description,
        "private": args.private,
        "has_wiki": args.has_wiki,
        "has_issues": args.has_issues,
        "has_projects": args.has_projects,
        "auto_init": args.auto_init,
    });
    if let Some(template) = &args.gitignore_template {
        body["gitignore_template"] = json!(template);
    }
    if let Some(template) = &args.license_template {
        body["license_template"] = json!(template);
    }
    body
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    let flag = |description: &str, default: bool| {
        json!({ "type": "boolean", "description": description, "default": default })
    };
    r.register(
        "github_create_repo",
        typed(github_create_repo),
        json!({
            "type": "function",
            "function": {
                "name": "github_create_repo",
                "description": "Create a new GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "The name of the repository" },
                        "description": {
                            "type": "string",
                            "description": "A description of the repository",
                            "default": ""
                        },
                        "private": flag("Whether the repository should be private", false),
                        "has_wiki": flag("Enable/disable wiki", true),
                        "has_issues": flag("Enable/disable issues", true),
                        "has_projects": flag("Enable/disable projects", true),
                        "auto_init": flag("Auto-initialize with README", true),
                        "gitignore_template": {
                            "type": "string",
                            "description": "Name of gitignore template (e.g., 'Rust', 'Node')"
                        },
                        "license_template": {
                            "type": "string",
                            "description": "Name of license template (e.g., 'mit', 'apache-2.0')"
                        },
                        "organization": {
                            "type": "string",
                            "description": "Optional organization name to create repo under"
                        },
                        "team_id": {
                            "type": "integer",
                            "description": "Optional team ID to grant access to"
                        }
                    },
                    "required": ["name"]
                }
            }
        }),
    )?;
    Ok(())
}

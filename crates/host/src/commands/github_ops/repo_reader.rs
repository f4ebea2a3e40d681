// crates/host/src/commands/github_ops/repo_reader.rs

use agent_commands_core::{typed, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};

use super::decode_contents;
use crate::commands::common::{parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "repo_reader",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    #[serde(default = "default_true")]
    include_readme: bool,
}

fn default_true() -> bool {
    true
}

fn repo_reader(args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let github = GitHub::from_env()?;

    let raw = github.get(&format!("repos/{}/{}", owner, repo))?;
    let mut result = summarize_repo(&raw);

    if args.include_readme {
        match github
            .get(&format!("repos/{}/{}/readme", owner, repo))
            .and_then(|readme| decode_contents(&readme))
        {
            Ok(text) => result["readme"] = json!(text),
            Err(err) => result["readme_error"] = json!(err.to_string()),
        }
    }
    Ok(result)
}

fn summarize_repo(raw: &Value) -> Value {
    json!({
        "name": raw["name"],
        "full_name": raw["full_name"],
        "description": raw["description"],
        "url": raw["html_url"],
        "stars": raw["stargazers_count"],
        "forks": raw["forks_count"],
        "open_issues": raw["open_issues_count"],
        "default_branch": raw["default_branch"],
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "language": raw["language"],
        "license": raw["license"]["name"],
        "topics": raw.get("topics").cloned().unwrap_or_else(|| json!([])),
        "visibility": raw["visibility"],
        "size": raw["size"],
        "homepage": raw["homepage"],
        "has_wiki": raw["has_wiki"],
        "has_pages": raw["has_pages"],
        "archived": raw["archived"],
    })
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_repo_reader",
        typed(repo_reader),
        json!({
            "type": "function",
            "function": {
                "name": "github_repo_reader",
                "description": "Read metadata and the README of a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": {
                            "type": "string",
                            "description": "The URL of the GitHub repository (e.g., 'https://github.com/owner/repo')"
                        },
                        "include_readme": {
                            "type": "boolean",
                            "description": "Whether to include the README content",
                            "default": true
                        }
                    },
                    "required": ["repo_url"]
                }
            }
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_repo() {
        let raw = json!({
            "name": "cargo",
            "full_name": "rust-lang/cargo",
            "html_url": "https://github.com/rust-lang/cargo",
            "stargazers_count": 12000,
            "forks_count": 2000,
            "license": { "name": "Apache License 2.0" },
            "archived": false
        });
        let out = summarize_repo(&raw);
        assert_eq!(out["stars"], json!(12000));
        assert_eq!(out["license"], json!("Apache License 2.0"));
        assert_eq!(out["topics"], json!([]));
        assert_eq!(out["language"], Value::Null);
    }
}

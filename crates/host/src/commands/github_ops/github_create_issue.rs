// crates/host/src/commands/github_ops/github_create_issue.rs

use agent_commands_core::{typed, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{expand_newlines, writer};
use crate::commands::common::parse_repo_url;

pub const MODULE: CommandModule = CommandModule {
    name: "github_create_issue",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    labels: Option<Vec<String>>,
    #[serde(default)]
    assignees: Option<Vec<String>>,
}

fn github_create_issue(args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let github = writer()?;

    let payload = issue_payload(&args);
    let created = github.post(&format!("repos/{}/{}/issues", owner, repo), &payload)?;
    info!(repo = %format!("{}/{}", owner, repo), number = %created["number"], "Created GitHub issue");

    Ok(json!({
        "issue_number": created["number"],
        "issue_url": created["html_url"],
        "title": created["title"],
        "state": created["state"],
        "created_at": created["created_at"],
        "repo_url": args.repo_url,
    }))
}

fn issue_payload(args: &Args) -> Value {
    let mut payload = Map::new();
    payload.insert("title".into(), json!(args.title.trim()));
    if let Some(body) = &args.body {
        payload.insert("body".into(), json!(expand_newlines(body)));
    }
    if let Some(labels) = args.labels.as_ref().filter(|l| !l.is_empty()) {
        payload.insert("labels".into(), json!(labels));
    }
    if let Some(assignees) = args.assignees.as_ref().filter(|a| !a.is_empty()) {
        payload.insert("assignees".into(), json!(assignees));
    }
    Value::Object(payload)
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_create_issue",
        typed(github_create_issue),
        json!({
            "type": "function",
            "function": {
                "name": "github_create_issue",
                "description": "Create a new issue in a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "title": { "type": "string", "description": "The title of the issue" },
                        "body": {
                            "type": "string",
                            "description": "The body text of the issue (supports markdown). Use \\n for newlines."
                        },
                        "labels": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Labels to apply to the issue"
                        },
                        "assignees": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "GitHub usernames to assign to the issue"
                        }
                    },
                    "required": ["repo_url", "title"]
                }
            }
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_commands_core::command::args;
    use serial_test::serial;

    #[test]
    fn test_payload_omits_empty_fields() {
        let payload = issue_payload(&Args {
            repo_url: "o/r".into(),
            title: " Bug ".into(),
            body: Some("line one\\nline two".into()),
            labels: Some(vec![]),
            assignees: Some(vec!["octocat".into()]),
        });
        assert_eq!(
            payload,
            json!({ "title": "Bug", "body": "line one\nline two", "assignees": ["octocat"] })
        );
    }

    #[test]
    #[serial]
    fn test_requires_token() {
        std::env::remove_var("GITHUB_TOKEN");
        let out = typed(github_create_issue)(&args(json!({ "repo_url": "o/r", "title": "x" })));
        assert_eq!(out["success"], json!(false));
        assert_eq!(out["error_kind"], json!("unavailable"));
    }
}

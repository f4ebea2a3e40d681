// crates/host/src/commands/github_ops/github_approve_pr.rs

use agent_commands_core::{typed, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::json;

use super::{expand_newlines, get_pull, writer};
use crate::commands::common::{login, parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_approve_pr",
    module_path: module_path!(),
    load,
};

const DEFAULT_REVIEW_BODY: &str = "Looks good! Approving this pull request.";

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    pr_number: u64,
    #[serde(default)]
    review_comment: Option<String>,
}

fn github_approve_pr(args: Args) -> CommandResult {
    approve_pr(&writer()?, args)
}

fn approve_pr(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let repo_path = format!("repos/{}/{}", owner, repo);

    let pr = get_pull(github, &repo_path, args.pr_number)?;
    let body = args
        .review_comment
        .as_deref()
        .map(expand_newlines)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_REVIEW_BODY.to_string());
    let review = github.post(
        &format!("{}/pulls/{}/reviews", repo_path, args.pr_number),
        &json!({ "body": body, "event": "APPROVE" }),
    )?;

    Ok(json!({
        "pr_number": args.pr_number,
        "pr_url": pr["html_url"],
        "approved_at": review["submitted_at"],
        "reviewer": login(&review["user"]),
        "review_id": review["id"],
        "review_state": review["state"],
        "repo_url": args.repo_url,
    }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_approve_pr",
        typed(github_approve_pr),
        json!({
            "type": "function",
            "function": {
                "name": "github_approve_pr",
                "description": "Approve a pull request in a GitHub repository",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "pr_number": { "type": "integer", "description": "The number of the pull request to approve" },
                        "review_comment": {
                            "type": "string",
                            "description": "Optional comment to include with the approval"
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
    use serde_json::Value;

    #[test]
    fn test_approves_with_default_body() {
        let server = TestServer::start(vec![
            (200, r#"{"number":6,"html_url":"https://github.com/o/r/pull/6"}"#),
            (200, r#"{"id":31,"state":"APPROVED","user":{"login":"bot"},"submitted_at":"2024-05-03T08:00:00Z"}"#),
        ]);
        let github = GitHub::new(&server.url, Some("t".into())).unwrap();

        let out = approve_pr(
            &github,
            Args {
                repo_url: "o/r".into(),
                pr_number: 6,
                review_comment: None,
            },
        )
        .unwrap();
        assert_eq!(out["review_id"], json!(31));
        assert_eq!(out["review_state"], json!("APPROVED"));
        assert_eq!(out["reviewer"], json!("bot"));

        let requests = server.finish();
        assert_eq!(requests[1].line, "POST /repos/o/r/pulls/6/reviews");
        let sent: Value = serde_json::from_str(&requests[1].body).unwrap();
        assert_eq!(sent, json!({ "body": DEFAULT_REVIEW_BODY, "event": "APPROVE" }));
    }
}

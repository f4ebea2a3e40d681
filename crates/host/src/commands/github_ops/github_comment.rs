// crates/host/src/commands/github_ops/github_comment.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{expand_newlines, get_pull, not_found, writer};
use crate::commands::common::{login, parse_repo_url, GitHub};

pub const MODULE: CommandModule = CommandModule {
    name: "github_comment",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    repo_url: String,
    pr_number: u64,
    comment_text: String,
    #[serde(default)]
    reply_to_comment_id: Option<u64>,
}

fn github_comment(args: Args) -> CommandResult {
    post_comment(&writer()?, args)
}

fn post_comment(github: &GitHub, args: Args) -> CommandResult {
    let (owner, repo) = parse_repo_url(&args.repo_url)?;
    let text = expand_newlines(&args.comment_text);
    if text.is_empty() {
        return Err(CommandError::invalid("comment_text must not be empty"));
    }

    let repo_path = format!("repos/{}/{}", owner, repo);
    get_pull(github, &repo_path, args.pr_number)?;

    let body = match args.reply_to_comment_id {
        Some(id) => {
            let original = github
                .get(&format!("{}/issues/comments/{}", repo_path, id))
                .map_err(|err| not_found(err, format!("could not find comment with ID {}", id)))?;
            reply_body(&original, &text)
        }
        None => text,
    };

    let comment = github.post(
        &format!("{}/issues/{}/comments", repo_path, args.pr_number),
        &json!({ "body": body }),
    )?;

    Ok(json!({
        "comment_id": comment["id"],
        "comment_url": comment["html_url"],
        "created_at": comment["created_at"],
        "author": login(&comment["user"]),
        "pr_number": args.pr_number,
        "repo_url": args.repo_url,
    }))
}

/// Quote the original comment above the reply.
fn reply_body(original: &Value, text: &str) -> String {
    let quoted = original["body"]
        .as_str()
        .unwrap_or_default()
        .split('\n')
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n");
    let author = login(&original["user"]);
    format!(
        "**In reply to [{}'s comment]({}):**\n\n{}\n\n---\n\n{}",
        author.as_str().unwrap_or("ghost"),
        original["html_url"].as_str().unwrap_or_default(),
        quoted,
        text
    )
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_comment",
        typed(github_comment),
        json!({
            "type": "function",
            "function": {
                "name": "github_comment",
                "description": "Add a comment to a GitHub pull request",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "repo_url": { "type": "string", "description": "The URL of the GitHub repository" },
                        "pr_number": { "type": "integer", "description": "The PR number to comment on" },
                        "comment_text": {
                            "type": "string",
                            "description": "The text content of the comment (supports markdown). Use \\n for newlines."
                        },
                        "reply_to_comment_id": {
                            "type": "integer",
                            "description": "Optional ID of a comment to reply to"
                        }
                    },
                    "required": ["repo_url", "pr_number", "comment_text"]
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

    fn comment_args(reply_to_comment_id: Option<u64>) -> Args {
        Args {
            repo_url: "https://github.com/o/r".into(),
            pr_number: 5,
            comment_text: "Thanks!\\nMerging soon.".into(),
            reply_to_comment_id,
        }
    }

    #[test]
    fn test_reply_quotes_original() {
        let original = json!({
            "body": "Looks off.\nSee line 3.",
            "user": { "login": "reviewer" },
            "html_url": "https://github.com/o/r/pull/1#issuecomment-9"
        });
        let body = reply_body(&original, "Fixed in abc123");
        assert_eq!(
            body,
            "**In reply to [reviewer's comment](https://github.com/o/r/pull/1#issuecomment-9):**\n\n\
             > Looks off.\n> See line 3.\n\n---\n\nFixed in abc123"
        );
    }

    #[test]
    fn test_reply_to_empty_comment_keeps_quote_marker() {
        let original = json!({ "body": "", "user": { "login": "a" }, "html_url": "u" });
        let body = reply_body(&original, "ok");
        assert!(body.contains("\n\n> \n\n---"));
    }

    #[test]
    fn test_missing_pull_request_is_not_found() {
        let server = TestServer::start(vec![(404, r#"{"message":"Not Found"}"#)]);
        let github = GitHub::new(&server.url, Some("t".into())).unwrap();

        let err = post_comment(&github, comment_args(None)).unwrap_err();
        assert_eq!(err, CommandError::NotFound("could not find PR #5".into()));
        let requests = server.finish();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].line, "GET /repos/o/r/pulls/5");
    }

    #[test]
    fn test_missing_reply_target_is_not_found() {
        let server = TestServer::start(vec![(200, r#"{"number":5}"#), (404, "{}")]);
        let github = GitHub::new(&server.url, Some("t".into())).unwrap();

        let err = post_comment(&github, comment_args(Some(77))).unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert_eq!(server.finish()[1].line, "GET /repos/o/r/issues/comments/77");
    }

    #[test]
    fn test_posts_expanded_comment() {
        let server = TestServer::start(vec![
            (200, r#"{"number":5}"#),
            (201, r#"{"id":9,"html_url":"c","user":{"login":"bot"}}"#),
        ]);
        let github = GitHub::new(&server.url, Some("t".into())).unwrap();

        let out = post_comment(&github, comment_args(None)).unwrap();
        assert_eq!(out["comment_id"], json!(9));
        assert_eq!(out["author"], json!("bot"));

        let requests = server.finish();
        assert_eq!(requests[1].line, "POST /repos/o/r/issues/5/comments");
        let sent: Value = serde_json::from_str(&requests[1].body).unwrap();
        assert_eq!(sent["body"], json!("Thanks!\nMerging soon."));
    }
}

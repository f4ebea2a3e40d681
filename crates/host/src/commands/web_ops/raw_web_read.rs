// crates/host/src/commands/web_ops/raw_web_read.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::commands::common::{
    html_to_text, http_client, send_checked, truncate, GoogleSearch, SearchHit,
};

pub const MODULE: CommandModule = CommandModule {
    name: "raw_web_read",
    module_path: module_path!(),
    load,
};

const TRUNCATION_MARKER: &str = "... (content truncated)";

#[derive(Deserialize)]
struct Args {
    query: String,
    #[serde(default = "default_num_results")]
    num_results: usize,
    #[serde(default)]
    include_html: bool,
    #[serde(default = "default_max_length")]
    max_length: usize,
}

fn default_num_results() -> usize {
    5
}

fn default_max_length() -> usize {
    50_000
}

fn raw_web_read(args: Args) -> CommandResult {
    let search = GoogleSearch::from_env()?;
    let page = search.search(&args.query, args.num_results)?;
    let client = http_client(15)?;

    let results: Vec<Value> = page
        .hits
        .iter()
        .map(|hit| {
            read_page(&client, hit, &args).unwrap_or_else(|err| {
                warn!(url = %hit.link, error = %err, "Failed to read search result");
                json!({ "url": hit.link, "error": err.to_string(), "error_kind": err.kind() })
            })
        })
        .collect();

    Ok(json!({
        "query": args.query,
        "total_results": results.len(),
        "results": results,
        "search_information": page.information,
    }))
}

fn read_page(client: &Client, hit: &SearchHit, args: &Args) -> Result<Value, CommandError> {
    let resp = send_checked(client.get(&hit.link))?;
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let html = resp.text()?;

    let mut result = page_content(&html, args.max_length, args.include_html);
    result["url"] = json!(hit.link);
    result["title"] = json!(hit.title);
    result["status_code"] = json!(status);
    result["content_type"] = json!(content_type);
    Ok(result)
}

fn page_content(html: &str, max_length: usize, include_html: bool) -> Value {
    let (mut text, truncated) = truncate(&html_to_text(html), max_length);
    if truncated {
        text.push_str(TRUNCATION_MARKER);
    }

    let mut result = json!({
        "content_length": text.chars().count(),
        "text_content": text,
        "truncated": truncated,
    });
    if include_html {
        result["html_content"] = json!(html);
    }
    result
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "raw_web_read",
        typed(raw_web_read),
        json!({
            "type": "function",
            "function": {
                "name": "raw_web_read",
                "description": "Search and read raw content from web pages using Google Custom Search API",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "The search query" },
                        "num_results": {
                            "type": "integer",
                            "description": "Number of results to return (default: 5)",
                            "default": 5
                        },
                        "include_html": {
                            "type": "boolean",
                            "description": "Whether to include the raw HTML (default: false)",
                            "default": false
                        },
                        "max_length": {
                            "type": "integer",
                            "description": "Maximum length of text content to return (default: 50000)",
                            "default": 50000
                        }
                    },
                    "required": ["query"]
                }
            }
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_page_content_truncates() {
        let html = "<html><body><p>abcdefghij</p></body></html>";
        let out = page_content(html, 4, false);
        assert_eq!(out["text_content"], json!("abcd... (content truncated)"));
        assert_eq!(out["truncated"], json!(true));
        assert!(out.get("html_content").is_none());

        let out = page_content(html, 100, true);
        assert_eq!(out["text_content"], json!("abcdefghij"));
        assert_eq!(out["content_length"], json!(10));
        assert_eq!(out["html_content"], json!(html));
    }

    #[test]
    #[serial]
    fn test_missing_credentials_unavailable() {
        std::env::remove_var("GOOGLE_SEARCH_API_KEY");
        std::env::remove_var("GOOGLE_SEARCH_CX");
        let out = typed(raw_web_read)(&agent_commands_core::command::args(json!({ "query": "rust" })));
        assert_eq!(out["success"], json!(false));
        assert_eq!(out["error_kind"], json!("unavailable"));
    }
}

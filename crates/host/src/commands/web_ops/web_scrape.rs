// crates/host/src/commands/web_ops/web_scrape.rs

//! Google Custom Search followed by a text scrape of every hit.

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::commands::common::{
    html_to_text, http_client, send_checked, truncate, GoogleSearch, SearchHit,
};

pub const MODULE: CommandModule = CommandModule {
    name: "web_scrape",
    module_path: module_path!(),
    load,
};

#[derive(Deserialize)]
struct Args {
    query: String,
    #[serde(default = "default_num_results")]
    num_results: usize,
    #[serde(default = "default_true")]
    include_content: bool,
    #[serde(default = "default_max_content_length")]
    max_content_length: usize,
}

fn default_num_results() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_max_content_length() -> usize {
    5000
}

fn web_scrape(args: Args) -> CommandResult {
    if args.query.trim().is_empty() {
        return Err(CommandError::invalid("query must not be empty"));
    }
    let search = GoogleSearch::from_env()?;
    let page = search.search(&args.query, args.num_results)?;
    let client = http_client(10)?;

    let results: Vec<Value> = page
        .hits
        .iter()
        .map(|hit| {
            scrape_hit(&client, hit, &args).unwrap_or_else(|err| {
                warn!(url = %hit.link, error = %err, "Failed to scrape search result");
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

fn scrape_hit(client: &Client, hit: &SearchHit, args: &Args) -> Result<Value, CommandError> {
    let html = send_checked(client.get(&hit.link))?.text()?;

    let mut result = json!({
        "title": hit.title,
        "url": hit.link,
        "snippet": hit.snippet,
        "display_url": hit.display_link,
    });
    if args.include_content {
        result["content"] = json!(page_text(&html, args.max_content_length));
    }
    Ok(result)
}

/// Visible text with one phrase per line. Runs of two spaces inside a text
/// node count as phrase breaks.
fn page_text(html: &str, max_len: usize) -> String {
    let text = html_to_text(html)
        .lines()
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let (mut text, cut) = truncate(&text, max_len);
    if cut {
        text.push_str("...");
    }
    text
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "web_scrape",
        typed(web_scrape),
        json!({
            "type": "function",
            "function": {
                "name": "web_scrape",
                "description": "Search and scrape web content using Google Custom Search API",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "The search query" },
                        "num_results": {
                            "type": "integer",
                            "description": "Number of results to return (default: 5)",
                            "default": 5
                        },
                        "include_content": {
                            "type": "boolean",
                            "description": "Whether to include the full content of pages (default: true)",
                            "default": true
                        },
                        "max_content_length": {
                            "type": "integer",
                            "description": "Maximum length of content to return (default: 5000)",
                            "default": 5000
                        }
                    },
                    "required": ["query"]
                }
            }
        }),
    )?;
    Ok(())
}

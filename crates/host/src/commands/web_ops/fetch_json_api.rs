// crates/host/src/commands/web_ops/fetch_json_api.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::commands::common::{http_client, send_checked, truncate, GoogleSearch, SearchHit};

pub const MODULE: CommandModule = CommandModule {
    name: "fetch_json_api",
    module_path: module_path!(),
    load,
};

const RAW_PREVIEW: usize = 1000;

#[derive(Deserialize)]
struct Args {
    query: String,
    #[serde(default = "default_num_results")]
    num_results: usize,
    #[serde(default = "default_timeout")]
    timeout: u64,
}

fn default_num_results() -> usize {
    5
}

fn default_timeout() -> u64 {
    30
}

fn fetch_json_api(args: Args) -> CommandResult {
    let client = http_client(args.timeout)?;
    let search = GoogleSearch::from_env()?;
    let page = search.search(&args.query, args.num_results)?;

    let results: Vec<Value> = page
        .hits
        .iter()
        .map(|hit| {
            fetch_hit(&client, hit).unwrap_or_else(|err| {
                warn!(url = %hit.link, error = %err, "Failed to fetch JSON result");
                let mut failed = json!({ "url": hit.link, "error": err.to_string(), "error_kind": err.kind() });
                if let CommandError::RemoteApi { status, .. } = err {
                    failed["status_code"] = json!(status);
                }
                failed
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

fn fetch_hit(client: &Client, hit: &SearchHit) -> Result<Value, CommandError> {
    let resp = send_checked(client.get(&hit.link).header(ACCEPT, "application/json"))?;
    let status = resp.status().as_u16();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let body = resp.text()?;

    Ok(json_result(hit, status, &content_type, &body))
}

fn json_result(hit: &SearchHit, status: u16, content_type: &str, body: &str) -> Value {
    match serde_json::from_str::<Value>(body) {
        Ok(data) => json!({
            "url": hit.link,
            "title": hit.title,
            "status_code": status,
            "content_type": content_type,
            "data": data,
        }),
        Err(_) => {
            let (mut raw, cut) = truncate(body, RAW_PREVIEW);
            if cut {
                raw.push_str("...");
            }
            json!({
                "url": hit.link,
                "error": "Response is not valid JSON",
                "content_type": content_type,
                "raw_content": raw,
            })
        }
    }
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "fetch_json_api",
        typed(fetch_json_api),
        json!({
            "type": "function",
            "function": {
                "name": "fetch_json_api",
                "description": "Search and fetch JSON data from web APIs using Google Custom Search API",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "The search query" },
                        "num_results": {
                            "type": "integer",
                            "description": "Number of results to return (default: 5)",
                            "default": 5
                        },
                        "timeout": {
                            "type": "integer",
                            "description": "Request timeout in seconds (default: 30)",
                            "default": 30
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
    use crate::commands::common::MAX_TIMEOUT_SECS;
    use crate::commands::test_http::TestServer;
    use agent_commands_core::command::args;

    fn hit() -> SearchHit {
        SearchHit {
            title: "Status API".into(),
            link: "https://api.example.com/status".into(),
            snippet: String::new(),
            display_link: "api.example.com".into(),
        }
    }

    #[test]
    fn test_json_body_parsed() {
        let out = json_result(&hit(), 200, "application/json", r#"{"ok": true}"#);
        assert_eq!(out["data"], json!({ "ok": true }));
        assert_eq!(out["title"], json!("Status API"));
        assert!(out.get("error").is_none());
    }

    #[test]
    fn test_non_json_body_reported() {
        let body = "<html>".repeat(300);
        let out = json_result(&hit(), 200, "text/html", &body);
        assert_eq!(out["error"], json!("Response is not valid JSON"));
        let raw = out["raw_content"].as_str().unwrap();
        assert_eq!(raw.chars().count(), RAW_PREVIEW + 3);
    }

    #[test]
    fn test_out_of_range_timeouts_rejected() {
        for timeout in [0, MAX_TIMEOUT_SECS + 1, u64::MAX] {
            let out = typed(fetch_json_api)(&args(json!({ "query": "x", "timeout": timeout })));
            assert_eq!(out["error_kind"], json!("invalid_argument"), "timeout {}", timeout);
        }
    }

    #[test]
    fn test_fetch_hit_reports_json_and_http_errors() {
        let server = TestServer::start(vec![(200, r#"{"ok": true}"#), (503, "down")]);
        let client = http_client(5).unwrap();
        let mut target = hit();
        target.link = format!("{}/status", server.url);

        let out = fetch_hit(&client, &target).unwrap();
        assert_eq!(out["data"], json!({ "ok": true }));
        assert_eq!(out["status_code"], json!(200));

        let err = fetch_hit(&client, &target).unwrap_err();
        assert_eq!(err.kind(), "remote_api_error");
        server.finish();
    }
}

// crates/host/src/commands/common.rs

//! Helpers shared by the web and GitHub commands.

use std::time::Duration;

use agent_commands_core::CommandError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use scraper::Html;
use serde::Deserialize;
use serde_json::{json, Value};

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; AgentCommands/1.0)";

/// Upper bound for caller-supplied request timeouts.
pub const MAX_TIMEOUT_SECS: u64 = 300;

const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Elements whose text never counts as page content.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "svg", "template", "head"];

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Blocking client with the shared user agent. Timeouts outside
/// `1..=MAX_TIMEOUT_SECS` are rejected.
pub fn http_client(timeout_secs: u64) -> Result<Client, CommandError> {
    if !(1..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
        return Err(CommandError::invalid(format!(
            "timeout must be between 1 and {} seconds, got {}",
            MAX_TIMEOUT_SECS, timeout_secs
        )));
    }
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| CommandError::Network(e.to_string()))
}

/// Send a request and turn any non-2xx status into [`CommandError::RemoteApi`].
pub fn send_checked(request: RequestBuilder) -> Result<Response, CommandError> {
    let resp = request.send()?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(CommandError::RemoteApi {
        status: status.as_u16(),
        body: truncate(&body, 500).0,
    })
}

/// Cut `s` to at most `max` characters. The flag reports whether anything was cut.
pub fn truncate(s: &str, max: usize) -> (String, bool) {
    match s.char_indices().nth(max) {
        Some((idx, _)) => (s[..idx].to_string(), true),
        None => (s.to_string(), false),
    }
}

/// Visible text of an HTML document, one text run per line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    BLANK_LINES.replace_all(&lines.join("\n"), "\n\n").into_owned()
}

/// Text of the document's `<title>`, if any.
pub fn html_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = scraper::Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `(owner, repo)` from a GitHub URL or an `owner/repo` shorthand.
pub fn parse_repo_url(repo_url: &str) -> Result<(String, String), CommandError> {
    let trimmed = repo_url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    let path = match url::Url::parse(trimmed) {
        Ok(parsed) => parsed.path().trim_matches('/').to_string(),
        Err(_) => trimmed
            .trim_start_matches("github.com/")
            .trim_matches('/')
            .to_string(),
    };

    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [owner, repo, ..] => Ok((owner.to_string(), repo.to_string())),
        _ => Err(CommandError::invalid(format!(
            "cannot read owner/repo from '{}'",
            repo_url
        ))),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Google Custom Search
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, rename = "displayLink")]
    pub display_link: String,
}

#[derive(Debug, Default)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub information: Value,
}

/// Client for the Google Custom Search JSON API.
///
/// Needs GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_CX.
pub struct GoogleSearch {
    api_key: String,
    cx: String,
    client: Client,
}

impl GoogleSearch {
    pub fn from_env() -> Result<Self, CommandError> {
        let api_key = non_empty_env("GOOGLE_SEARCH_API_KEY");
        let cx = non_empty_env("GOOGLE_SEARCH_CX");
        match (api_key, cx) {
            (Some(api_key), Some(cx)) => Ok(Self {
                api_key,
                cx,
                client: http_client(30)?,
            }),
            _ => Err(CommandError::Unavailable(
                "Google search credentials not set (GOOGLE_SEARCH_API_KEY, GOOGLE_SEARCH_CX)"
                    .to_string(),
            )),
        }
    }

    /// The API serves at most 10 results per request.
    pub fn search(&self, query: &str, num_results: usize) -> Result<SearchPage, CommandError> {
        let num = num_results.clamp(1, 10).to_string();
        let request = self.client.get(GOOGLE_SEARCH_URL).query(&[
            ("key", self.api_key.as_str()),
            ("cx", self.cx.as_str()),
            ("q", query),
            ("num", num.as_str()),
            ("lr", "lang_en"),
            ("safe", "active"),
        ]);
        let body: Value = send_checked(request)?.json()?;

        let hits = match body.get("items") {
            Some(items) => serde_json::from_value(items.clone())?,
            None => Vec::new(),
        };
        Ok(SearchPage {
            hits,
            information: body
                .get("searchInformation")
                .cloned()
                .unwrap_or_else(|| json!({})),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GitHub REST
// ─────────────────────────────────────────────────────────────────────────────

/// Minimal GitHub REST v3 client.
///
/// Reads GITHUB_TOKEN (optional for reads) and GITHUB_API_URL (defaults to
/// the public API).
pub struct GitHub {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHub {
    pub fn from_env() -> Result<Self, CommandError> {
        let api_base = non_empty_env("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string());
        Self::new(api_base, non_empty_env("GITHUB_TOKEN"))
    }

    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Result<Self, CommandError> {
        Ok(Self {
            client: http_client(30)?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Fail early for write operations that need a token.
    pub fn require_token(&self) -> Result<(), CommandError> {
        match self.token {
            Some(_) => Ok(()),
            None => Err(CommandError::Unavailable(
                "GitHub token not found; set GITHUB_TOKEN".to_string(),
            )),
        }
    }

    pub fn get(&self, path: &str) -> Result<Value, CommandError> {
        self.get_with(path, &[])
    }

    pub fn get_with(&self, path: &str, query: &[(&str, String)]) -> Result<Value, CommandError> {
        let request = self.authorize(self.client.get(self.url(path))).query(query);
        Ok(send_checked(request)?.json()?)
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<Value, CommandError> {
        self.send_json(Method::POST, path, body)
    }

    pub fn patch(&self, path: &str, body: &Value) -> Result<Value, CommandError> {
        self.send_json(Method::PATCH, path, body)
    }

    pub fn put(&self, path: &str, body: &Value) -> Result<Value, CommandError> {
        self.send_json(Method::PUT, path, body)
    }

    /// DELETE answers 204 without a body.
    pub fn delete(&self, path: &str) -> Result<(), CommandError> {
        send_checked(self.authorize(self.client.delete(self.url(path))))?;
        Ok(())
    }

    /// An empty response body (204) comes back as `Value::Null`.
    fn send_json(&self, method: Method, path: &str, body: &Value) -> Result<Value, CommandError> {
        let request = self
            .authorize(self.client.request(method, self.url(path)))
            .json(body);
        let text = send_checked(request)?.text()?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Login of a GitHub user object, or "ghost" for deleted accounts.
pub fn login(user: &Value) -> Value {
    user.get("login").cloned().unwrap_or_else(|| json!("ghost"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_http::TestServer;

    #[test]
    fn test_parse_repo_url_variants() {
        let expected = ("rust-lang".to_string(), "cargo".to_string());
        assert_eq!(parse_repo_url("https://github.com/rust-lang/cargo").unwrap(), expected);
        assert_eq!(parse_repo_url("https://github.com/rust-lang/cargo/").unwrap(), expected);
        assert_eq!(parse_repo_url("https://github.com/rust-lang/cargo.git").unwrap(), expected);
        assert_eq!(
            parse_repo_url("https://github.com/rust-lang/cargo/issues/12").unwrap(),
            expected
        );
        assert_eq!(parse_repo_url("rust-lang/cargo").unwrap(), expected);
        assert_eq!(parse_repo_url("github.com/rust-lang/cargo").unwrap(), expected);
    }

    #[test]
    fn test_parse_repo_url_rejects_missing_repo() {
        let err = parse_repo_url("https://github.com/rust-lang").unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), ("hé".to_string(), true));
        assert_eq!(truncate("abc", 3), ("abc".to_string(), false));
        assert_eq!(truncate("", 0), (String::new(), false));
    }

    #[test]
    fn test_html_to_text_skips_scripts_and_styles() {
        let html = r#"<html><head><title>T</title><style>p { color: red }</style></head>
            <body><h1>Heading</h1><script>var x = 1;</script>
            <p>First paragraph.</p><noscript>enable js</noscript><p>Second</p></body></html>"#;
        let text = html_to_text(html);
        assert_eq!(text, "Heading\nFirst paragraph.\nSecond");
    }

    #[test]
    fn test_html_title() {
        assert_eq!(
            html_title("<html><head><title> Hello </title></head></html>"),
            Some("Hello".to_string())
        );
        assert_eq!(html_title("<p>no title</p>"), None);
    }

    #[test]
    fn test_http_client_rejects_out_of_range_timeouts() {
        assert_eq!(http_client(0).unwrap_err().kind(), "invalid_argument");
        assert_eq!(http_client(u64::MAX).unwrap_err().kind(), "invalid_argument");
        assert_eq!(
            http_client(MAX_TIMEOUT_SECS + 1).unwrap_err().kind(),
            "invalid_argument"
        );
        assert!(http_client(MAX_TIMEOUT_SECS).is_ok());
    }

    #[test]
    fn test_send_checked_maps_error_status_to_remote_api() {
        let server = TestServer::start(vec![(404, "not found")]);
        let client = http_client(5).unwrap();
        let err = send_checked(client.get(format!("{}/missing", server.url))).unwrap_err();
        assert_eq!(
            err,
            CommandError::RemoteApi {
                status: 404,
                body: "not found".into()
            }
        );
        assert_eq!(server.finish()[0].line, "GET /missing");
    }

    #[test]
    fn test_send_checked_truncates_long_error_bodies() {
        let body = "x".repeat(800);
        let server = TestServer::start(vec![(500, body.as_str())]);
        let client = http_client(5).unwrap();
        match send_checked(client.get(&server.url)).unwrap_err() {
            CommandError::RemoteApi { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), 500);
            }
            other => panic!("expected remote API error, got {:?}", other),
        }
        server.finish();
    }

    #[test]
    fn test_github_client_write_methods() {
        let server = TestServer::start(vec![(201, r#"{"id": 1}"#), (204, ""), (204, "")]);
        let gh = GitHub::new(&server.url, Some("t".into())).unwrap();
        let created = gh.post("/repos/o/r/issues", &json!({ "title": "x" })).unwrap();
        assert_eq!(created["id"], json!(1));
        gh.delete("repos/o/r/git/refs/heads/topic").unwrap();
        let empty = gh.put("teams/1/repos/o/r", &json!({ "permission": "push" })).unwrap();
        assert_eq!(empty, Value::Null);

        let requests = server.finish();
        assert_eq!(requests[0].line, "POST /repos/o/r/issues");
        assert_eq!(requests[0].body, r#"{"title":"x"}"#);
        assert_eq!(requests[1].line, "DELETE /repos/o/r/git/refs/heads/topic");
        assert_eq!(requests[2].line, "PUT /teams/1/repos/o/r");
    }

    #[test]
    fn test_write_requires_token() {
        let gh = GitHub::new("http://127.0.0.1:9", None).unwrap();
        assert_eq!(gh.require_token().unwrap_err().kind(), "unavailable");

        let gh = GitHub::new("http://127.0.0.1:9/", Some("t".into())).unwrap();
        assert!(gh.require_token().is_ok());
        assert_eq!(gh.url("/repos/a/b"), "http://127.0.0.1:9/repos/a/b");
    }
}

// crates/host/src/commands/web_ops/web_search.rs

//! Web search over DuckDuckGo's HTML endpoint. Needs no API key.
//!
//! With `include_snippets`, each hit is fetched and its title and first
//! substantial paragraph replace the search engine's.

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::commands::common::{html_title, http_client, send_checked, truncate};

pub const MODULE: CommandModule = CommandModule {
    name: "web_search",
    module_path: module_path!(),
    load,
};

const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
const MAX_RESULTS: usize = 25;
/// Paragraphs this short are usually navigation or cookie banners.
const MIN_PARAGRAPH_CHARS: usize = 50;
const MAX_SNIPPET_CHARS: usize = 500;

static RESULT: Lazy<Selector> = Lazy::new(|| selector(".result"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("a.result__a"));
static SNIPPET: Lazy<Selector> = Lazy::new(|| selector(".result__snippet"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

#[derive(Deserialize)]
struct Args {
    query: String,
    #[serde(default = "default_num_results")]
    num_results: usize,
    #[serde(default = "default_true")]
    include_snippets: bool,
}

fn default_num_results() -> usize {
    5
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, PartialEq)]
struct SearchResult {
    title: String,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn web_search(args: Args) -> CommandResult {
    if args.query.trim().is_empty() {
        return Err(CommandError::invalid("query must not be empty"));
    }
    let limit = args.num_results.clamp(1, MAX_RESULTS);

    let client = http_client(10)?;
    let url = format!("{}?q={}", SEARCH_URL, urlencoding::encode(&args.query));
    let html = send_checked(client.get(&url))?.text()?;
    let mut results = parse_results(&html, limit);
    for result in &mut results {
        if args.include_snippets {
            enrich_from_page(&client, result);
        } else {
            result.snippet = None;
        }
    }
    debug!(query = %args.query, count = results.len(), "Web search finished");

    Ok(json!({
        "query": args.query,
        "total_results": results.len(),
        "results": results,
    }))
}

fn parse_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for result in document.select(&RESULT) {
        let Some(anchor) = result.select(&TITLE).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let title = collapse(anchor.text());
        let snippet = result
            .select(&SNIPPET)
            .next()
            .map(|s| collapse(s.text()))
            .filter(|s| !s.is_empty());

        results.push(SearchResult {
            title,
            url: decode_result_link(href),
            snippet,
            error: None,
        });
        if results.len() >= limit {
            break;
        }
    }
    results
}

/// Fetch the hit's page. A page that cannot be read keeps the search
/// engine's title and snippet and carries the error.
fn enrich_from_page(client: &reqwest::blocking::Client, result: &mut SearchResult) {
    let page = send_checked(client.get(&result.url)).and_then(|resp| Ok(resp.text()?));
    match page {
        Ok(html) => {
            if let Some(title) = html_title(&html) {
                result.title = title;
            }
            if let Some(paragraph) = first_paragraph(&html) {
                result.snippet = Some(paragraph);
            }
        }
        Err(err) => {
            debug!(url = %result.url, error = %err, "Could not fetch search result page");
            result.error = Some(err.to_string());
        }
    }
}

/// First paragraph long enough to say something, cut to 500 characters.
fn first_paragraph(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let text = document
        .select(&PARAGRAPH)
        .map(|p| collapse(p.text()))
        .find(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)?;
    let (mut snippet, cut) = truncate(&text, MAX_SNIPPET_CHARS);
    if cut {
        snippet.push_str("...");
    }
    Some(snippet)
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result links go through a `/l/?uddg=<target>` redirect; return the target.
fn decode_result_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    url::Url::parse(&absolute)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "uddg")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or(absolute)
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "web_search",
        typed(web_search),
        json!({
            "type": "function",
            "function": {
                "name": "web_search",
                "description": "Search the web for information about a topic",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "The search query" },
                        "num_results": {
                            "type": "integer",
                            "description": "Number of results to return (default: 5)",
                            "default": 5
                        },
                        "include_snippets": {
                            "type": "boolean",
                            "description": "Whether to include text snippets from the pages (default: true)",
                            "default": true
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
    use crate::commands::test_http::TestServer;

    const PAGE: &str = r##"
        <div class="result results_links">
          <h2 class="result__title">
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc">Rust <b>Programming</b> Language</a>
          </h2>
          <a class="result__snippet" href="#">A language empowering everyone to build
             reliable software.</a>
        </div>
        <div class="result">
          <a class="result__a" href="https://doc.rust-lang.org/book/">The Book</a>
        </div>
        <div class="result"><span>ad without a link</span></div>
        <div class="result">
          <a class="result__a" href="https://crates.io/">crates.io</a>
        </div>"##;

    #[test]
    fn test_parse_results() {
        let results = parse_results(PAGE, 10);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0],
            SearchResult {
                title: "Rust Programming Language".into(),
                url: "https://www.rust-lang.org/".into(),
                snippet: Some("A language empowering everyone to build reliable software.".into()),
                error: None,
            }
        );
        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert_eq!(results[1].snippet, None);
    }

    #[test]
    fn test_first_paragraph_skips_short_text() {
        let long = "Rust is a systems language that guarantees memory safety without a garbage collector.";
        let html = format!("<p>Menu</p><p>  {}  </p><p>{}</p>", long, "later ".repeat(20));
        assert_eq!(first_paragraph(&html), Some(long.to_string()));
        assert_eq!(first_paragraph("<p>short</p>"), None);

        let huge = format!("<p>{}</p>", "word ".repeat(200));
        let snippet = first_paragraph(&huge).unwrap();
        assert_eq!(snippet.chars().count(), MAX_SNIPPET_CHARS + 3);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_enrich_from_page_uses_page_title_and_keeps_errors() {
        let page = "<html><head><title>Rust Book</title></head><body><p>The Rust Programming Language, an introductory book about Rust.</p></body></html>";
        let server = TestServer::start(vec![(200, page), (404, "gone")]);
        let client = http_client(5).unwrap();

        let mut found = SearchResult {
            title: "Book".into(),
            url: format!("{}/book", server.url),
            snippet: None,
            error: None,
        };
        enrich_from_page(&client, &mut found);
        assert_eq!(found.title, "Rust Book");
        assert_eq!(
            found.snippet.as_deref(),
            Some("The Rust Programming Language, an introductory book about Rust.")
        );

        let mut missing = SearchResult {
            title: "Gone".into(),
            url: format!("{}/gone", server.url),
            snippet: Some("engine snippet".into()),
            error: None,
        };
        enrich_from_page(&client, &mut missing);
        assert_eq!(missing.title, "Gone");
        assert_eq!(missing.snippet.as_deref(), Some("engine snippet"));
        assert!(missing.error.unwrap().contains("404"));
        server.finish();
    }

    #[test]
    fn test_parse_results_respects_limit() {
        assert_eq!(parse_results(PAGE, 2).len(), 2);
    }

    #[test]
    fn test_empty_query_rejected() {
        let err = web_search(Args {
            query: " ".into(),
            num_results: 5,
            include_snippets: true,
        })
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }
}

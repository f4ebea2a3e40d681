// crates/host/src/commands/web_ops/extract_links.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::commands::common::{html_title, http_client, send_checked, truncate};

pub const MODULE: CommandModule = CommandModule {
    name: "extract_links",
    module_path: module_path!(),
    load,
};

const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:"];
const MAX_LINK_TEXT: usize = 100;
const REDIRECT_TIMEOUT_SECS: u64 = 5;

const MEDIA_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".mp4", ".webm", ".avi", ".mov",
];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".txt", ".csv", ".zip", ".rar",
];

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

#[derive(Deserialize)]
struct Args {
    url: String,
    #[serde(default = "default_true")]
    categorize: bool,
    #[serde(default)]
    follow_redirects: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
struct Link {
    url: String,
    text: String,
    title: String,
    is_relative: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_url: Option<String>,
    /// Set together with `final_url`; null when the HEAD request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<Option<u16>>,
}

fn extract_links(args: Args) -> CommandResult {
    let base = Url::parse(&args.url)
        .map_err(|e| CommandError::invalid(format!("invalid url '{}': {}", args.url, e)))?;

    let client = http_client(15)?;
    let html = send_checked(client.get(base.clone()))?.text()?;
    let mut links = collect_links(&base, &html);

    let mut result = json!({
        "url": args.url,
        "title": html_title(&html),
        "total_links": links.len(),
    });
    if args.categorize {
        if args.follow_redirects {
            let head_client = http_client(REDIRECT_TIMEOUT_SECS)?;
            for link in links.iter_mut().filter(|l| !is_internal(&base, &l.url)) {
                resolve_redirect(&head_client, link);
            }
        }
        result["categories"] = categorize(&base, &links);
    }
    result["links"] = json!(links);
    Ok(result)
}

/// Every usable anchor on the page, resolved against `base`, in page order.
fn collect_links(base: &Url, html: &str) -> Vec<Link> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href").map(str::trim) else {
            continue;
        };
        let lowered = href.to_ascii_lowercase();
        if href.is_empty() || SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
            continue;
        }
        let Ok(absolute) = base.join(href) else {
            continue;
        };

        let text = anchor.text().collect::<String>();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let (mut text, cut) = truncate(&text, MAX_LINK_TEXT);
        if cut {
            text.push_str("...");
        }
        if text.is_empty() {
            text = "[No Text]".to_string();
        }

        links.push(Link {
            url: absolute.to_string(),
            text,
            title: anchor.value().attr("title").unwrap_or_default().to_string(),
            is_relative: is_relative(href),
            final_url: None,
            status_code: None,
        });
    }
    links
}

/// An href without its own host, like `guide.html` or `/about`.
fn is_relative(href: &str) -> bool {
    if href.starts_with("//") {
        return false;
    }
    Url::parse(href).map_or(true, |u| u.host_str().is_none())
}

fn is_internal(base: &Url, link: &str) -> bool {
    Url::parse(link).map_or(true, |u| u.host_str().is_none() || u.host_str() == base.host_str())
}

fn has_extension(link: &str, extensions: &[&str]) -> bool {
    let lowered = link.to_ascii_lowercase();
    extensions.iter().any(|ext| lowered.ends_with(ext))
}

/// Internal and external are exclusive; media and document links overlap
/// with both.
fn categorize(base: &Url, links: &[Link]) -> Value {
    let bucket = |keep: &dyn Fn(&Link) -> bool| {
        let matching: Vec<&Link> = links.iter().filter(|l| keep(*l)).collect();
        json!({ "count": matching.len(), "links": matching })
    };
    json!({
        "internal_links": bucket(&|l: &Link| is_internal(base, &l.url)),
        "external_links": bucket(&|l: &Link| !is_internal(base, &l.url)),
        "media_links": bucket(&|l: &Link| has_extension(&l.url, MEDIA_EXTENSIONS)),
        "document_links": bucket(&|l: &Link| has_extension(&l.url, DOCUMENT_EXTENSIONS)),
    })
}

/// Follow redirects with a HEAD request. A failed request keeps the link's
/// own URL and a null status.
fn resolve_redirect(client: &Client, link: &mut Link) {
    match client.head(&link.url).send() {
        Ok(resp) => {
            link.final_url = Some(resp.url().to_string());
            link.status_code = Some(Some(resp.status().as_u16()));
        }
        Err(_) => {
            link.final_url = Some(link.url.clone());
            link.status_code = Some(None);
        }
    }
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "extract_links",
        typed(extract_links),
        json!({
            "type": "function",
            "function": {
                "name": "extract_links",
                "description": "Extract and optionally categorize all links from a webpage",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "url": { "type": "string", "description": "The URL to extract links from" },
                        "categorize": {
                            "type": "boolean",
                            "description": "Whether to categorize links by type (default: true)",
                            "default": true
                        },
                        "follow_redirects": {
                            "type": "boolean",
                            "description": "Whether to follow redirects when categorizing external links (default: false)",
                            "default": false
                        }
                    },
                    "required": ["url"]
                }
            }
        }),
    )?;
    Ok(())
}

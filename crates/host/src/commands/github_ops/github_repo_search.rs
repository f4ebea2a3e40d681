// crates/host/src/commands/github_ops/github_repo_search.rs

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::commands::common::GitHub;

pub const MODULE: CommandModule = CommandModule {
    name: "github_repo_search",
    module_path: module_path!(),
    load,
};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum Sort {
    #[default]
    Stars,
    Forks,
    Updated,
    HelpWantedIssues,
}

impl Sort {
    fn as_str(self) -> &'static str {
        match self {
            Sort::Stars => "stars",
            Sort::Forks => "forks",
            Sort::Updated => "updated",
            Sort::HelpWantedIssues => "help-wanted-issues",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

#[derive(Deserialize)]
struct Args {
    query: String,
    #[serde(default)]
    sort: Sort,
    #[serde(default)]
    order: Order,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    min_stars: Option<u64>,
}

fn default_limit() -> usize {
    10
}

fn github_repo_search(args: Args) -> CommandResult {
    if args.query.trim().is_empty() {
        return Err(CommandError::invalid("query must not be empty"));
    }
    if args.limit == 0 {
        return Err(CommandError::invalid("limit must be at least 1"));
    }
    let github = GitHub::from_env()?;
    let q = search_query(&args);

    let raw = github.get_with(
        "search/repositories",
        &[
            ("q", q.clone()),
            ("sort", args.sort.as_str().to_string()),
            ("order", args.order.as_str().to_string()),
            ("per_page", args.limit.clamp(1, 100).to_string()),
        ],
    )?;

    let repositories: Vec<Value> = raw["items"]
        .as_array()
        .into_iter()
        .flatten()
        .take(args.limit)
        .map(repo_summary)
        .collect();

    Ok(json!({
        "query": q,
        "total_count": raw["total_count"],
        "returned": repositories.len(),
        "repositories": repositories,
    }))
}

/// Free text plus GitHub search qualifiers.
fn search_query(args: &Args) -> String {
    let mut q = args.query.trim().to_string();
    if let Some(language) = args.language.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        q.push_str(&format!(" language:{}", language));
    }
    if let Some(stars) = args.min_stars {
        q.push_str(&format!(" stars:>={}", stars));
    }
    q
}

fn repo_summary(raw: &Value) -> Value {
    json!({
        "name": raw["full_name"],
        "description": raw["description"],
        "url": raw["html_url"],
        "stars": raw["stargazers_count"],
        "forks": raw["forks_count"],
        "language": raw["language"],
        "created_at": raw["created_at"],
        "updated_at": raw["updated_at"],
        "topics": raw.get("topics").cloned().unwrap_or_else(|| json!([])),
        "license": raw["license"]["name"],
        "open_issues": raw["open_issues_count"],
        "default_branch": raw["default_branch"],
    })
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "github_repo_search",
        typed(github_repo_search),
        json!({
            "type": "function",
            "function": {
                "name": "github_repo_search",
                "description": "Search GitHub repositories",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Search keywords" },
                        "sort": {
                            "type": "string",
                            "enum": ["stars", "forks", "updated", "help-wanted-issues"],
                            "description": "Sort field",
                            "default": "stars"
                        },
                        "order": {
                            "type": "string",
                            "enum": ["asc", "desc"],
                            "description": "Sort order",
                            "default": "desc"
                        },
                        "limit": {
                            "type": "integer",
                            "description": "Maximum number of repositories to return (1-100)",
                            "default": 10
                        },
                        "language": { "type": "string", "description": "Only repositories in this language" },
                        "min_stars": { "type": "integer", "description": "Minimum number of stars" }
                    },
                    "required": ["query"]
                }
            }
        }),
    )?;
    Ok(())
}

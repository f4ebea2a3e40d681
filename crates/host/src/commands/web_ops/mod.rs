// crates/host/src/commands/web_ops/mod.rs

//! Web search and page-reading commands.

pub mod extract_links;
pub mod fetch_json_api;
pub mod raw_web_read;
pub mod web_scrape;
pub mod web_search;

use agent_commands_core::CategoryModule;

pub fn category() -> CategoryModule {
    CategoryModule::new(
        "web_ops",
        vec![
            web_search::MODULE,
            web_scrape::MODULE,
            raw_web_read::MODULE,
            extract_links::MODULE,
            fetch_json_api::MODULE,
        ],
    )
}

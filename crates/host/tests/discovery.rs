use agent_commands_core::command::args;
use agent_commands_core::presentation::render_commands;
use agent_commands_core::{discover_commands, DiscoveryConfig};
use agent_commands_host::manifest;
use serde_json::json;

const HEADLESS_COMMANDS: &[&str] = &[
    "text_analysis",
    "read_file",
    "write_file",
    "append_file",
    "edit_file",
    "advanced_edit_file",
    "delete_file",
    "file_exists",
    "list_directory",
    "create_directory",
    "load_json",
    "save_json",
    "convert_document",
    "github_repo_reader",
    "github_issue_reader",
    "github_pr_reader",
    "github_read_files",
    "github_create_issue",
    "github_comment",
    "github_repo_search",
    "github_create_branch",
    "github_add_files",
    "github_create_pr",
    "github_merge_pr",
    "github_close_pr",
    "github_reopen_pr",
    "github_approve_pr",
    "github_create_repo",
    "web_search",
    "web_scrape",
    "raw_web_read",
    "extract_links",
    "fetch_json_api",
];

#[test]
fn test_headless_discovery_skips_screenshot() {
    let (registry, report) = discover_commands(manifest(), DiscoveryConfig::default().headless(true)).unwrap();

    assert_eq!(report.excluded, vec!["system_ops.screenshot".to_string()]);
    assert!(report.failed.is_empty());
    assert!(!registry.contains("take_screenshot"));
    assert_eq!(registry.names(), HEADLESS_COMMANDS.to_vec());
    assert_eq!(registry.list_schemas().len(), HEADLESS_COMMANDS.len());
}

#[test]
fn test_screenshot_considered_outside_headless_mode() {
    let (registry, report) = discover_commands(manifest(), DiscoveryConfig::default()).unwrap();

    assert!(report.excluded.is_empty());
    let id = "system_ops.screenshot".to_string();
    let loaded = report.loaded.contains(&id);
    let failed = report.failed.iter().any(|(module, _)| *module == id);
    assert!(loaded ^ failed);
    assert_eq!(registry.contains("take_screenshot"), loaded);
}

#[test]
fn test_schema_names_match_registrations() {
    let (registry, _) = discover_commands(manifest(), DiscoveryConfig::default().headless(true)).unwrap();

    for schema in registry.list_schemas() {
        let command = registry.get(schema.name()).unwrap();
        assert_eq!(command.name, schema.function.name);
        assert!(!schema.description().is_empty());
        for required in &schema.function.parameters.required {
            assert!(schema.function.parameters.properties.contains_key(required));
        }
    }
}

#[test]
fn test_categories_follow_module_layout() {
    let (registry, _) = discover_commands(manifest(), DiscoveryConfig::default().headless(true)).unwrap();
    let by_category = registry.list_by_category();

    let categories: Vec<&str> = by_category.keys().map(String::as_str).collect();
    assert_eq!(categories, vec!["data_ops", "file_ops", "github_ops", "web_ops"]);
    assert_eq!(by_category["file_ops"].len(), 12);
    assert_eq!(by_category["github_ops"].len(), 15);
    assert_eq!(registry.get("github_comment").unwrap().category, "github_ops");
}

#[test]
fn test_listing_shows_every_category() {
    let (registry, _) = discover_commands(manifest(), DiscoveryConfig::default().headless(true)).unwrap();
    let out = render_commands(&registry);

    for heading in ["Data Ops Commands:", "File Ops Commands:", "Github Ops Commands:", "Web Ops Commands:"] {
        assert!(out.contains(heading), "missing {heading}");
    }
    assert!(out.contains(&format!("Total commands: {}", HEADLESS_COMMANDS.len())));
}

#[test]
fn test_dispatch_through_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.txt");
    let path = path.to_str().unwrap();
    let (registry, _) = discover_commands(manifest(), DiscoveryConfig::default().headless(true)).unwrap();

    let written = registry
        .invoke("write_file", &args(json!({ "file_path": path, "content": "hi" })))
        .unwrap();
    assert_eq!(written["success"], json!(true));

    let read = registry
        .invoke("read_file", &args(json!({ "file_path": path })))
        .unwrap();
    assert_eq!(read["content"], json!("hi"));

    let missing_arg = registry.invoke("read_file", &args(json!({}))).unwrap();
    assert_eq!(missing_arg["error_kind"], json!("invalid_argument"));
}

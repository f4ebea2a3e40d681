// crates/core/src/presentation.rs

//! Human-readable listing of registered commands.

use std::fmt::Write;

use crate::registry::CommandRegistry;

const RULE_WIDTH: usize = 50;
const CATEGORY_RULE_WIDTH: usize = 30;

/// Render every command grouped by category.
///
/// Categories and the commands inside them are sorted, so the output is
/// stable for a given set of registrations. Read-only over the registry.
pub fn render_commands(registry: &CommandRegistry) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    let _ = writeln!(out, "\nAvailable Commands:");
    let _ = writeln!(out, "{}", rule);

    let by_category = registry.list_by_category();
    if by_category.is_empty() {
        let _ = writeln!(out, "No commands registered yet.");
        return out;
    }

    let width = by_category
        .values()
        .flatten()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
        + 2;

    for (category, names) in &by_category {
        let _ = writeln!(out, "\n{} Commands:", display_category(category));
        let _ = writeln!(out, "{}", "-".repeat(CATEGORY_RULE_WIDTH));
        for name in names {
            let description = registry
                .description(name)
                .unwrap_or("No description available");
            let _ = writeln!(out, "  {:<width$}  {}", name, description, width = width);
        }
    }

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "Total commands: {}", registry.len());
    out
}

/// Print [`render_commands`] to stdout.
pub fn print_commands(registry: &CommandRegistry) {
    println!("{}", render_commands(registry));
}

/// "file_ops" -> "File Ops"
fn display_category(category: &str) -> String {
    category
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_message() {
        let out = render_commands(&CommandRegistry::new());
        assert!(out.contains("No commands registered yet."));
        assert!(!out.contains("Total commands"));
    }

    #[test]
    fn test_display_category() {
        assert_eq!(display_category("file_ops"), "File Ops");
        assert_eq!(display_category("GITHUB_ops"), "Github Ops");
        assert_eq!(display_category("misc"), "Misc");
    }
}

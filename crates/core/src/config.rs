// crates/core/src/config.rs

//! Discovery configuration.

use anyhow::{Context, Result};

use crate::registry::DuplicatePolicy;

/// What discovery does when a command module fails to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadFailurePolicy {
    /// Log the failure and keep discovering the remaining modules.
    #[default]
    SkipAndLog,
    /// Stop discovery and return the error.
    Abort,
}

/// Settings consumed by [`crate::discovery::Discovery`].
///
/// Environment variables read by [`DiscoveryConfig::from_env`]:
/// - CI: "true" (any case) turns on headless mode
/// - AGENT_HEADLESS: "1" or "true" turns on headless mode
/// - AGENT_COMMANDS_STRICT: "1" or "true" aborts discovery on the first load failure
/// - AGENT_COMMANDS_DUPLICATES: "reject" (default), "replace" or "keep_first"
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Running without a display; GUI-dependent commands are not loaded.
    pub headless: bool,
    /// `(category, command)` pairs that need a display.
    pub gui_commands: Vec<(String, String)>,
    pub on_load_failure: LoadFailurePolicy,
    pub duplicates: DuplicatePolicy,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            headless: false,
            gui_commands: vec![("system_ops".to_string(), "screenshot".to_string())],
            on_load_failure: LoadFailurePolicy::default(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

impl DiscoveryConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        let ci = std::env::var("CI").unwrap_or_default();
        let headless = std::env::var("AGENT_HEADLESS").unwrap_or_default();
        config.headless = ci.eq_ignore_ascii_case("true") || is_truthy(&headless);

        if is_truthy(&std::env::var("AGENT_COMMANDS_STRICT").unwrap_or_default()) {
            config.on_load_failure = LoadFailurePolicy::Abort;
        }

        if let Ok(raw) = std::env::var("AGENT_COMMANDS_DUPLICATES") {
            if !raw.trim().is_empty() {
                config.duplicates = raw
                    .parse()
                    .map_err(anyhow::Error::msg)
                    .context("invalid AGENT_COMMANDS_DUPLICATES")?;
            }
        }

        Ok(config)
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn on_load_failure(mut self, policy: LoadFailurePolicy) -> Self {
        self.on_load_failure = policy;
        self
    }

    /// Whether `(category, command)` must be skipped in this run.
    pub fn excludes(&self, category: &str, command: &str) -> bool {
        self.headless
            && self
                .gui_commands
                .iter()
                .any(|(c, m)| c == category && m == command)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "CI",
            "AGENT_HEADLESS",
            "AGENT_COMMANDS_STRICT",
            "AGENT_COMMANDS_DUPLICATES",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_excludes_only_in_headless_mode() {
        let config = DiscoveryConfig::default();
        assert!(!config.excludes("system_ops", "screenshot"));

        let config = config.headless(true);
        assert!(config.excludes("system_ops", "screenshot"));
        assert!(!config.excludes("file_ops", "read_file"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = DiscoveryConfig::from_env().unwrap();
        assert!(!config.headless);
        assert_eq!(config.on_load_failure, LoadFailurePolicy::SkipAndLog);
        assert_eq!(config.duplicates, DuplicatePolicy::Reject);
    }

    #[test]
    #[serial]
    fn test_from_env_ci_flag() {
        clear_env();
        std::env::set_var("CI", "TRUE");
        std::env::set_var("AGENT_COMMANDS_STRICT", "1");
        std::env::set_var("AGENT_COMMANDS_DUPLICATES", "replace");
        let config = DiscoveryConfig::from_env().unwrap();
        clear_env();

        assert!(config.headless);
        assert_eq!(config.on_load_failure, LoadFailurePolicy::Abort);
        assert_eq!(config.duplicates, DuplicatePolicy::Replace);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_duplicate_policy() {
        clear_env();
        std::env::set_var("AGENT_COMMANDS_DUPLICATES", "sometimes");
        let result = DiscoveryConfig::from_env();
        clear_env();
        assert!(result.is_err());
    }
}

// crates/core/src/discovery.rs

//! One-shot population of a [`CommandRegistry`] from a compiled-in manifest.
//!
//! The manifest lists categories and, inside each, the command modules with
//! their load functions. Discovery walks it in order, skips modules excluded
//! by the [`DiscoveryConfig`], and runs each remaining load function against
//! a [`Registrar`]. The load function does the registering; discovery only
//! commits what it staged.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::command::CommandFn;
use crate::config::{DiscoveryConfig, LoadFailurePolicy};
use crate::error::RegistryError;
use crate::registry::{CommandRegistry, PendingCommand};
use crate::types::{category_from_module_path, CommandSchema};

/// Load step of a command module. Registers through the [`Registrar`]; an
/// error means the module is unusable in this process.
pub type LoadFn = fn(&mut Registrar<'_>) -> anyhow::Result<()>;

/// One command module in the manifest.
#[derive(Clone, Copy)]
pub struct CommandModule {
    /// Module name inside its category, e.g. "read_file".
    pub name: &'static str,
    /// `module_path!()` of the module; the category is derived from it.
    pub module_path: &'static str,
    pub load: LoadFn,
}

impl std::fmt::Debug for CommandModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandModule")
            .field("name", &self.name)
            .field("module_path", &self.module_path)
            .finish_non_exhaustive()
    }
}

/// A category and the command modules it contains.
#[derive(Debug, Clone)]
pub struct CategoryModule {
    pub name: &'static str,
    pub commands: Vec<CommandModule>,
}

impl CategoryModule {
    pub fn new(name: &'static str, commands: Vec<CommandModule>) -> Self {
        Self { name, commands }
    }
}

/// Staging handle given to a module's load function.
///
/// Schemas are parsed immediately, but registrations only reach the registry
/// after the load function returns `Ok`.
pub struct Registrar<'a> {
    module_path: &'a str,
    staged: Vec<PendingCommand>,
}

impl<'a> Registrar<'a> {
    pub fn new(module_path: &'a str) -> Self {
        Self {
            module_path,
            staged: Vec::new(),
        }
    }

    /// Stage a command whose schema is authored as JSON. Name checks run when
    /// the module's batch is committed.
    pub fn register(
        &mut self,
        name: &str,
        handler: CommandFn,
        schema: Value,
    ) -> Result<(), RegistryError> {
        let schema = CommandSchema::from_value(schema)?;
        self.staged.push(PendingCommand {
            name: name.to_string(),
            category: category_from_module_path(self.module_path),
            handler,
            schema,
        });
        Ok(())
    }

    fn into_staged(self) -> Vec<PendingCommand> {
        self.staged
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiscoveryState {
    #[default]
    NotRun,
    Running,
    Done,
}

/// Outcome of a discovery pass. Module ids are `category.command`.
#[derive(Debug, Default, Clone)]
pub struct DiscoveryReport {
    pub loaded: Vec<String>,
    pub excluded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A module broke the registration contract. Always fatal.
    #[error("command module '{module}' violated the registration contract: {source}")]
    Contract {
        module: String,
        #[source]
        source: RegistryError,
    },

    /// A module failed to load under [`LoadFailurePolicy::Abort`].
    #[error("command module '{module}' failed to load: {source:#}")]
    LoadFailed {
        module: String,
        #[source]
        source: anyhow::Error,
    },
}

pub struct Discovery {
    config: DiscoveryConfig,
    manifest: Vec<CategoryModule>,
    state: DiscoveryState,
    loaded: HashSet<String>,
}

impl Discovery {
    pub fn new(manifest: Vec<CategoryModule>, config: DiscoveryConfig) -> Self {
        Self {
            config,
            manifest,
            state: DiscoveryState::NotRun,
            loaded: HashSet::new(),
        }
    }

    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    /// Load every module of the manifest into `registry`.
    ///
    /// Modules loaded by an earlier pass are not loaded again, so repeating
    /// discovery never duplicates registrations.
    pub fn discover(
        &mut self,
        registry: &mut CommandRegistry,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        self.state = DiscoveryState::Running;
        let result = self.run(registry);
        self.state = DiscoveryState::Done;
        result
    }

    fn run(&mut self, registry: &mut CommandRegistry) -> Result<DiscoveryReport, DiscoveryError> {
        let mut report = DiscoveryReport::default();

        for category in &self.manifest {
            debug!(category = category.name, "Loading command category");

            for module in &category.commands {
                let id = format!("{}.{}", category.name, module.name);

                if self.config.excludes(category.name, module.name) {
                    info!(module = %id, "Skipping GUI command module in headless mode");
                    report.excluded.push(id);
                    continue;
                }

                if self.loaded.contains(&id) {
                    debug!(module = %id, "Command module already loaded");
                    continue;
                }

                let mut registrar = Registrar::new(module.module_path);
                match (module.load)(&mut registrar) {
                    Ok(()) => {
                        registry
                            .commit(registrar.into_staged())
                            .map_err(|source| DiscoveryError::Contract {
                                module: id.clone(),
                                source,
                            })?;
                        info!(module = %id, "Loaded command module");
                        self.loaded.insert(id.clone());
                        report.loaded.push(id);
                    }
                    Err(err) => {
                        if let Some(contract) = err.downcast_ref::<RegistryError>() {
                            return Err(DiscoveryError::Contract {
                                module: id,
                                source: contract.clone(),
                            });
                        }
                        match self.config.on_load_failure {
                            LoadFailurePolicy::Abort => {
                                return Err(DiscoveryError::LoadFailed { module: id, source: err });
                            }
                            LoadFailurePolicy::SkipAndLog => {
                                warn!(module = %id, error = %format!("{:#}", err), "Skipping command module that failed to load");
                                report.failed.push((id, format!("{:#}", err)));
                            }
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Build a registry from `manifest` in one call.
pub fn discover_commands(
    manifest: Vec<CategoryModule>,
    config: DiscoveryConfig,
) -> Result<(CommandRegistry, DiscoveryReport), DiscoveryError> {
    let mut registry = CommandRegistry::with_policy(config.duplicates);
    let mut discovery = Discovery::new(manifest, config);
    let report = discovery.discover(&mut registry)?;
    Ok((registry, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::handler;
    use serde_json::json;

    fn schema(name: &str) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": name,
                "description": format!("{} command", name),
                "parameters": { "type": "object", "properties": {}, "required": [] }
            }
        })
    }

    fn load_hello(r: &mut Registrar<'_>) -> anyhow::Result<()> {
        r.register("hello", handler(|_| json!("hi")), schema("hello"))?;
        Ok(())
    }

    fn load_screenshot(r: &mut Registrar<'_>) -> anyhow::Result<()> {
        r.register("take_screenshot", handler(|_| json!("saved")), schema("take_screenshot"))?;
        Ok(())
    }

    fn load_broken(r: &mut Registrar<'_>) -> anyhow::Result<()> {
        r.register("half_done", handler(|_| json!(null)), schema("half_done"))?;
        anyhow::bail!("optional dependency missing")
    }

    fn load_mismatched(r: &mut Registrar<'_>) -> anyhow::Result<()> {
        r.register("declared", handler(|_| json!(null)), schema("something_else"))?;
        Ok(())
    }

    fn manifest(extra: Vec<CommandModule>) -> Vec<CategoryModule> {
        let mut system = vec![CommandModule {
            name: "screenshot",
            module_path: "host::commands::system_ops::screenshot",
            load: load_screenshot,
        }];
        system.extend(extra);
        vec![
            CategoryModule::new(
                "greetings",
                vec![CommandModule {
                    name: "hello",
                    module_path: "host::commands::greetings::hello",
                    load: load_hello,
                }],
            ),
            CategoryModule::new("system_ops", system),
        ]
    }

    #[test]
    fn test_headless_excludes_gui_module() {
        let config = DiscoveryConfig::default().headless(true);
        let (registry, report) = discover_commands(manifest(vec![]), config).unwrap();
        assert!(!registry.contains("take_screenshot"));
        assert!(registry.contains("hello"));
        assert_eq!(report.excluded, vec!["system_ops.screenshot".to_string()]);
    }

    #[test]
    fn test_gui_module_present_when_not_headless() {
        let (registry, report) =
            discover_commands(manifest(vec![]), DiscoveryConfig::default()).unwrap();
        assert!(registry.contains("take_screenshot"));
        assert!(report.excluded.is_empty());
        assert_eq!(registry.get("take_screenshot").unwrap().category, "system_ops");
    }

    #[test]
    fn test_repeated_discovery_does_not_duplicate() {
        let mut registry = CommandRegistry::new();
        let mut discovery = Discovery::new(manifest(vec![]), DiscoveryConfig::default());
        assert_eq!(discovery.state(), DiscoveryState::NotRun);

        discovery.discover(&mut registry).unwrap();
        let second = discovery.discover(&mut registry).unwrap();

        assert_eq!(discovery.state(), DiscoveryState::Done);
        assert_eq!(registry.list_schemas().len(), 2);
        assert!(second.loaded.is_empty());
        assert!(second.failed.is_empty());
    }

    #[test]
    fn test_failed_module_skipped_without_partial_state() {
        let broken = CommandModule {
            name: "broken",
            module_path: "host::commands::system_ops::broken",
            load: load_broken,
        };
        let (registry, report) =
            discover_commands(manifest(vec![broken]), DiscoveryConfig::default()).unwrap();

        assert!(!registry.contains("half_done"));
        assert!(registry.contains("hello"));
        assert!(registry.contains("take_screenshot"));
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "system_ops.broken");
        assert!(report.failed[0].1.contains("optional dependency missing"));
    }

    #[test]
    fn test_failed_module_aborts_under_strict_policy() {
        let broken = CommandModule {
            name: "broken",
            module_path: "host::commands::system_ops::broken",
            load: load_broken,
        };
        let config = DiscoveryConfig::default().on_load_failure(LoadFailurePolicy::Abort);
        let err = discover_commands(manifest(vec![broken]), config).unwrap_err();
        assert!(matches!(err, DiscoveryError::LoadFailed { ref module, .. } if module == "system_ops.broken"));
    }

    #[test]
    fn test_name_mismatch_is_fatal() {
        let mismatched = CommandModule {
            name: "declared",
            module_path: "host::commands::system_ops::declared",
            load: load_mismatched,
        };
        let err = discover_commands(manifest(vec![mismatched]), DiscoveryConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::Contract {
                source: RegistryError::NameMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_across_modules_is_fatal() {
        let again = CommandModule {
            name: "hello_again",
            module_path: "host::commands::system_ops::hello_again",
            load: load_hello,
        };
        let err =
            discover_commands(manifest(vec![again]), DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DiscoveryError::Contract {
                source: RegistryError::Duplicate(_),
                ..
            }
        ));
    }
}

// crates/core/src/registry.rs

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::command::{CommandArgs, CommandFn};
use crate::error::{DispatchError, RegistryError};
use crate::types::{CommandName, CommandSchema};

/// What to do when a name is registered twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail with [`RegistryError::Duplicate`].
    #[default]
    Reject,
    /// Last registration wins. The schema keeps its original position.
    Replace,
    /// First registration wins; later ones are ignored with a warning.
    KeepFirst,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" | "error" | "fail" => Ok(DuplicatePolicy::Reject),
            "replace" | "last" | "last_wins" => Ok(DuplicatePolicy::Replace),
            "keep_first" | "first" | "first_wins" => Ok(DuplicatePolicy::KeepFirst),
            other => Err(format!("unknown duplicate policy '{}'", other)),
        }
    }
}

/// A command as stored in the registry.
#[derive(Clone)]
pub struct RegisteredCommand {
    pub name: CommandName,
    pub category: String,
    handler: CommandFn,
    schema_index: usize,
}

impl RegisteredCommand {
    /// Invoke the command function directly.
    pub fn call(&self, args: &CommandArgs) -> Value {
        (self.handler)(args)
    }
}

impl fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// A registration waiting to be committed, see [`CommandRegistry::commit`].
pub struct PendingCommand {
    pub name: CommandName,
    pub category: String,
    pub handler: CommandFn,
    pub schema: CommandSchema,
}

/// Single source of truth for which commands exist, how to call them and how
/// to describe them to a tool-calling LLM.
///
/// Invariant: every name in `commands` has exactly one schema in `schemas`.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<CommandName, RegisteredCommand>,
    schemas: Vec<CommandSchema>,
    duplicates: DuplicatePolicy,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(duplicates: DuplicatePolicy) -> Self {
        Self {
            duplicates,
            ..Self::default()
        }
    }

    /// Register one command under `category`.
    ///
    /// Fails without touching the registry when the name is empty, the schema
    /// is malformed, `schema.function.name != name`, or the name is taken
    /// under [`DuplicatePolicy::Reject`].
    pub fn register(
        &mut self,
        name: &str,
        category: &str,
        handler: CommandFn,
        schema: CommandSchema,
    ) -> Result<(), RegistryError> {
        self.commit(vec![PendingCommand {
            name: name.to_string(),
            category: category.to_string(),
            handler,
            schema,
        }])
    }

    /// Register several commands as one unit: either all are checked and
    /// inserted, or none is.
    pub fn commit(&mut self, pending: Vec<PendingCommand>) -> Result<(), RegistryError> {
        let mut batch_names = HashSet::new();
        for cmd in &pending {
            self.check(&cmd.name, &cmd.schema)?;
            if !batch_names.insert(cmd.name.as_str()) && self.duplicates == DuplicatePolicy::Reject
            {
                return Err(RegistryError::Duplicate(cmd.name.clone()));
            }
        }

        for cmd in pending {
            self.insert(cmd);
        }
        Ok(())
    }

    fn check(&self, name: &str, schema: &CommandSchema) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if schema.name() != name {
            return Err(RegistryError::NameMismatch {
                name: name.to_string(),
                schema: schema.name().to_string(),
            });
        }
        schema.validate()?;
        if self.commands.contains_key(name) && self.duplicates == DuplicatePolicy::Reject {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, cmd: PendingCommand) {
        if let Some(existing) = self.commands.get_mut(&cmd.name) {
            if self.duplicates == DuplicatePolicy::KeepFirst {
                warn!(command = %cmd.name, "Ignoring duplicate registration, first one wins");
                return;
            }
            warn!(command = %cmd.name, "Replacing previously registered command");
            self.schemas[existing.schema_index] = cmd.schema;
            existing.handler = cmd.handler;
            existing.category = cmd.category;
            return;
        }

        info!(command = %cmd.name, category = %cmd.category, "Registering command");
        let schema_index = self.schemas.len();
        self.schemas.push(cmd.schema);
        self.commands.insert(
            cmd.name.clone(),
            RegisteredCommand {
                name: cmd.name,
                category: cmd.category,
                handler: cmd.handler,
                schema_index,
            },
        );
    }

    /// Lookup a command by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    /// Look up and run a command. An unknown name is
    /// [`DispatchError::NotFound`]; a panic inside the command only fails
    /// this call.
    pub fn invoke(&self, name: &str, args: &CommandArgs) -> Result<Value, DispatchError> {
        let command = self
            .get(name)
            .ok_or_else(|| DispatchError::NotFound(name.to_string()))?;
        debug!(command = %name, "Dispatching command");
        call_guarded(name, &command.handler, args)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// All schemas in registration order.
    pub fn list_schemas(&self) -> &[CommandSchema] {
        &self.schemas
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.get(name)
            .map(|c| self.schemas[c.schema_index].description())
    }

    /// Category → command names, both sorted.
    pub fn list_by_category(&self) -> BTreeMap<String, Vec<CommandName>> {
        let mut by_category: BTreeMap<String, Vec<CommandName>> = BTreeMap::new();
        for command in self.commands.values() {
            by_category
                .entry(command.category.clone())
                .or_default()
                .push(command.name.clone());
        }
        for names in by_category.values_mut() {
            names.sort();
        }
        by_category
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(CommandSchema::name).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .field("duplicates", &self.duplicates)
            .finish()
    }
}

/// Run a handler, turning a panic into [`DispatchError::Panicked`].
fn call_guarded(name: &str, handler: &CommandFn, args: &CommandArgs) -> Result<Value, DispatchError> {
    panic::catch_unwind(AssertUnwindSafe(|| handler(args))).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        DispatchError::Panicked {
            name: name.to_string(),
            message,
        }
    })
}

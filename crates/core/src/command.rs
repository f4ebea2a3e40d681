// crates/core/src/command.rs

//! Calling convention shared by every command.
//!
//! A command receives a flat JSON object of arguments and returns a JSON
//! value. Commands written against [`typed`] get argument parsing and the
//! `{success, ...}` / `{success: false, error, error_kind}` payload shape for
//! free.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::error::CommandError;

/// Arguments as decoded from an LLM tool call.
pub type CommandArgs = Map<String, Value>;

/// Type-erased command function.
pub type CommandFn = Arc<dyn Fn(&CommandArgs) -> Value + Send + Sync>;

/// Result type used inside command implementations.
pub type CommandResult = Result<Value, CommandError>;

/// Wrap any closure as a [`CommandFn`].
pub fn handler<F>(f: F) -> CommandFn
where
    F: Fn(&CommandArgs) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a function taking a deserializable argument struct.
///
/// Argument decoding failures become an `invalid_argument` payload instead of
/// reaching the caller as a panic or a raw serde error.
pub fn typed<T, F>(f: F) -> CommandFn
where
    T: DeserializeOwned + 'static,
    F: Fn(T) -> CommandResult + Send + Sync + 'static,
{
    Arc::new(move |args: &CommandArgs| respond(parse_args::<T>(args).and_then(&f)))
}

/// Decode an argument object into `T`, applying its serde defaults.
pub fn parse_args<T: DeserializeOwned>(args: &CommandArgs) -> Result<T, CommandError> {
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|e| CommandError::InvalidArgument(format!("invalid arguments: {}", e)))
}

/// Build an argument object from a `json!` literal. Non-objects give an empty map.
pub fn args(value: Value) -> CommandArgs {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Turn a command result into the payload returned to the caller.
///
/// Objects get `success: true` unless they already say otherwise; any other
/// value is wrapped as `{success: true, result: <value>}`.
pub fn respond(result: CommandResult) -> Value {
    match result {
        Ok(Value::Object(mut map)) => {
            map.entry("success").or_insert(Value::Bool(true));
            Value::Object(map)
        }
        Ok(other) => json!({ "success": true, "result": other }),
        Err(err) => error_payload(&err),
    }
}

pub fn error_payload(err: &CommandError) -> Value {
    let mut payload = json!({
        "success": false,
        "error": err.to_string(),
        "error_kind": err.kind(),
    });
    if let CommandError::RemoteApi { status, body } = err {
        payload["status"] = json!(status);
        payload["body"] = json!(body);
    }
    payload
}

/// True when a payload reports failure, either through `success: false` or a
/// bare `error` key.
pub fn is_error_payload(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.get("success").and_then(Value::as_bool) == Some(false)
                || (map.contains_key("error") && map.get("success").is_none())
        }
        _ => false,
    }
}

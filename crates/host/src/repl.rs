// crates/host/src/repl.rs

//! Line grammar of the interactive shell: `<command> [json-args]`.

use agent_commands_core::CommandArgs;
use serde_json::Value;

#[derive(Debug, PartialEq)]
pub enum Line {
    Empty,
    Quit,
    Help,
    /// Reprint the command listing.
    List,
    /// Print the tool definitions as JSON.
    Schemas,
    Call { name: String, args: CommandArgs },
}

pub const HELP: &str = "\
Usage:
  <command> [json-args]   run a command, e.g. read_file {\"file_path\": \"Cargo.toml\"}
  :list                   list commands by category
  :schemas                print tool definitions as JSON
  :help                   show this help
  quit | exit             leave";

pub fn parse_line(input: &str) -> Result<Line, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Line::Empty);
    }
    if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
        return Ok(Line::Quit);
    }
    match input {
        ":help" | ":h" | "?" => return Ok(Line::Help),
        ":list" => return Ok(Line::List),
        ":schemas" => return Ok(Line::Schemas),
        _ => {}
    }
    if input.starts_with(':') {
        return Err(format!("unknown shell command '{}'; try :help", input));
    }

    let (name, rest) = match input.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (input, ""),
    };
    let args = if rest.is_empty() {
        CommandArgs::new()
    } else {
        match serde_json::from_str::<Value>(rest) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err("arguments must be a JSON object".to_string()),
            Err(e) => return Err(format!("invalid JSON arguments: {}", e)),
        }
    };

    Ok(Line::Call {
        name: name.to_string(),
        args,
    })
}

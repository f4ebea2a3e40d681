// crates/host/src/main.rs

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;

use agent_commands_core::command::is_error_payload;
use agent_commands_core::presentation::render_commands;
use agent_commands_core::{CommandRegistry, Discovery, DiscoveryConfig, DispatchError};
use agent_commands_host::repl::{parse_line, Line, HELP};
use agent_commands_host::{init_tracing, log, manifest};

fn main() -> Result<()> {
    init_tracing("info");

    let config = DiscoveryConfig::from_env()?;
    let mut registry = CommandRegistry::with_policy(config.duplicates);
    let mut discovery = Discovery::new(manifest(), config);
    let report = discovery
        .discover(&mut registry)
        .context("command discovery failed")?;

    for (module, reason) in &report.failed {
        log::warn(format!("{} not loaded: {}", module, reason));
    }
    for module in &report.excluded {
        log::info(format!("{} skipped (headless)", module));
    }
    log::success(format!("Loaded {} commands.", registry.len()));

    println!("{}", render_commands(&registry));
    println!("Type a command with JSON arguments, or :help. Type 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let line = match parse_line(&input) {
            Ok(line) => line,
            Err(msg) => {
                log::error(msg);
                continue;
            }
        };

        match line {
            Line::Empty => continue,
            Line::Quit => {
                println!("Goodbye!");
                break;
            }
            Line::Help => println!("{}", HELP),
            Line::List => println!("{}", render_commands(&registry)),
            Line::Schemas => {
                println!("{}", serde_json::to_string_pretty(registry.list_schemas())?)
            }
            Line::Call { name, args } => {
                let args_text = serde_json::to_string(&args)?;
                log::call(&name, &args_text);
                debug!(command = %name, "Dispatching");

                match registry.invoke(&name, &args) {
                    Ok(output) => {
                        let text = serde_json::to_string_pretty(&output)?;
                        log::result(&name, &text, is_error_payload(&output));
                        println!("{}\n", text);
                    }
                    Err(DispatchError::NotFound(_)) => {
                        log::error(format!("unknown command '{}'; try :list", name));
                    }
                    Err(err) => log::error(err),
                }
            }
        }
    }

    Ok(())
}

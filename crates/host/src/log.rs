// crates/host/src/log.rs

//! Colored console output for the interactive shell.

use std::fmt::Display;

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Log a command call.
pub fn call(name: &str, args: &str) {
    let args_preview = truncate(args, 100);
    eprintln!("{CYAN}{BOLD}→ {}{RESET} {DIM}{}{RESET}", name, args_preview);
}

/// Log a command result.
pub fn result(name: &str, output: &str, is_error: bool) {
    let preview = truncate(output, 150);
    let (symbol, color) = if is_error { ("✗", RED) } else { ("✓", GREEN) };
    eprintln!("{color}{symbol} {}{RESET}: {DIM}{}{RESET}", name, preview);
}

pub fn info(message: impl Display) {
    eprintln!("{DIM}[info]{RESET} {}", message);
}

pub fn warn(message: impl Display) {
    eprintln!("{YELLOW}[warn]{RESET} {}", message);
}

pub fn success(message: impl Display) {
    eprintln!("{GREEN}[ok]{RESET} {}", message);
}

pub fn error(message: impl Display) {
    eprintln!("{RED}{BOLD}[error]{RESET} {}", message);
}

/// Single-line preview, cut at `max` characters.
fn truncate(s: &str, max: usize) -> String {
    let clean: String = s
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let trimmed = clean.trim();
    match trimmed.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

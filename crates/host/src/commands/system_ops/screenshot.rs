// crates/host/src/commands/system_ops/screenshot.rs

//! Screen capture through whichever platform utility is installed.
//!
//! Discovery skips this module in headless mode. When no utility is found the
//! module fails to load instead of registering a command that cannot work.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use anyhow::anyhow;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

pub const MODULE: CommandModule = CommandModule {
    name: "screenshot",
    module_path: module_path!(),
    load,
};

/// Utilities tried in order, with the arguments that precede the output path.
const UTILITIES: &[(&str, &[&str])] = &[
    ("screencapture", &["-x"]),
    ("grim", &[]),
    ("gnome-screenshot", &["-f"]),
    ("scrot", &["-o"]),
    ("import", &["-window", "root"]),
];

#[derive(Debug, Clone)]
struct Utility {
    program: PathBuf,
    args: &'static [&'static str],
}

impl Utility {
    fn detect() -> Option<Self> {
        UTILITIES.iter().find_map(|&(name, args)| {
            which::which(name).ok().map(|program| Utility { program, args })
        })
    }
}

#[derive(Deserialize)]
struct Args {
    #[serde(default = "default_filename")]
    filename: String,
}

fn default_filename() -> String {
    "screenshot.png".to_string()
}

fn take_screenshot(utility: &Utility, args: Args) -> CommandResult {
    let target = Path::new(&args.filename);
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CommandError::from_io(e, parent))?;
    }

    debug!(program = %utility.program.display(), file = %args.filename, "Taking screenshot");
    let output = Command::new(&utility.program)
        .args(utility.args)
        .arg(&args.filename)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CommandError::Unavailable(format!("failed to run screenshot utility: {}", e)))?;

    if !output.status.success() {
        return Err(CommandError::Io(format!(
            "screenshot utility failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(json!({ "message": format!("Screenshot saved to {}", args.filename), "path": args.filename }))
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    let utility = Utility::detect().ok_or_else(|| {
        anyhow!(
            "no screenshot utility found (tried {})",
            UTILITIES.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ")
        )
    })?;

    r.register(
        "take_screenshot",
        typed(move |args: Args| take_screenshot(&utility, args)),
        json!({
            "type": "function",
            "function": {
                "name": "take_screenshot",
                "description": "Take a screenshot and save it to the specified file.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "filename": {
                            "type": "string",
                            "description": "The name of the screenshot file (default: screenshot.png)"
                        }
                    },
                    "required": []
                }
            }
        }),
    )?;
    Ok(())
}

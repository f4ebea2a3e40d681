// crates/host/src/commands/file_ops/convert_document.rs

//! Document conversion through pandoc, with a small built-in converter for
//! the text formats when pandoc is not installed.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use agent_commands_core::{typed, CommandError, CommandModule, CommandResult, Registrar};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::ensure_parent;
use crate::commands::common::html_to_text;

pub const MODULE: CommandModule = CommandModule {
    name: "convert_document",
    module_path: module_path!(),
    load,
};

const PANDOC_TIMEOUT: Duration = Duration::from_secs(60);

const FORMATS: &[&str] = &[
    "txt", "md", "markdown", "html", "htm", "pdf", "docx", "doc", "rtf", "odt",
];

#[derive(Deserialize)]
struct Args {
    input_file: String,
    output_format: String,
    #[serde(default)]
    output_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextFormat {
    Plain,
    Markdown,
    Html,
}

impl TextFormat {
    fn parse(ext: &str) -> Option<Self> {
        match ext {
            "txt" => Some(TextFormat::Plain),
            "md" | "markdown" => Some(TextFormat::Markdown),
            "html" | "htm" => Some(TextFormat::Html),
            _ => None,
        }
    }
}

fn convert_document(args: Args) -> CommandResult {
    convert_with(args, which::which("pandoc").ok())
}

fn convert_with(args: Args, pandoc: Option<PathBuf>) -> CommandResult {
    let input = Path::new(&args.input_file);
    if !input.is_file() {
        return Err(CommandError::NotFound(format!(
            "input file {} does not exist",
            args.input_file
        )));
    }

    let from = extension(input)
        .ok_or_else(|| CommandError::invalid("input file has no extension to detect its format"))?;
    let to = args.output_format.trim().trim_start_matches('.').to_ascii_lowercase();
    for format in [&from, &to] {
        if !FORMATS.contains(&format.as_str()) {
            return Err(CommandError::invalid(format!(
                "unsupported format '{}'; expected one of {}",
                format,
                FORMATS.join(", ")
            )));
        }
    }

    let output_file = match args.output_file {
        Some(path) if !path.trim().is_empty() => path,
        _ => input.with_extension(&to).to_string_lossy().into_owned(),
    };
    ensure_parent(&output_file)?;

    let method = match pandoc {
        Some(pandoc) => {
            run_pandoc(&pandoc, &args.input_file, &output_file, &from, &to)?;
            "pandoc"
        }
        None => {
            let content = fs::read_to_string(input)
                .map_err(|e| CommandError::from_io(e, &args.input_file))?;
            let converted = convert_builtin(&content, &from, &to)?;
            fs::write(&output_file, converted).map_err(|e| CommandError::from_io(e, &output_file))?;
            "builtin"
        }
    };

    Ok(json!({
        "input_file": args.input_file,
        "output_file": output_file,
        "from_format": from,
        "to_format": to,
        "method": method,
    }))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

fn pandoc_format(ext: &str) -> &str {
    match ext {
        "md" | "markdown" => "markdown",
        "txt" => "plain",
        "htm" | "html" => "html",
        other => other,
    }
}

fn run_pandoc(
    pandoc: &Path,
    input: &str,
    output: &str,
    from: &str,
    to: &str,
) -> Result<(), CommandError> {
    let mut cmd = Command::new(pandoc);
    cmd.args(["-f", pandoc_format(from), "-t", pandoc_format(to), "-o", output, input]);
    if to == "pdf" {
        cmd.arg("--pdf-engine=xelatex");
    }
    debug!(?cmd, "Running pandoc");

    let child = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CommandError::Unavailable(format!("failed to start pandoc: {}", e)))?;

    let (status, stderr) = wait_with_deadline(child, PANDOC_TIMEOUT)?;
    if status.success() {
        return Ok(());
    }
    Err(CommandError::Io(format!("pandoc failed: {}", stderr.trim())))
}

/// Poll `child` until it exits or `timeout` passes. Stderr is drained on a
/// separate thread so a chatty child cannot block on a full pipe.
fn wait_with_deadline(
    mut child: Child,
    timeout: Duration,
) -> Result<(ExitStatus, String), CommandError> {
    let reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CommandError::Timeout(format!(
                "pandoc did not finish within {}s",
                timeout.as_secs()
            )));
        }
        thread::sleep(Duration::from_millis(100));
    };

    let stderr = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Ok((status, stderr))
}

fn convert_builtin(content: &str, from: &str, to: &str) -> Result<String, CommandError> {
    let unsupported = || {
        CommandError::Unavailable(format!(
            "conversion from {} to {} is not supported without pandoc",
            from, to
        ))
    };
    let source = TextFormat::parse(from).ok_or_else(unsupported)?;
    let target = TextFormat::parse(to).ok_or_else(unsupported)?;

    Ok(match (source, target) {
        (TextFormat::Html, TextFormat::Html) => content.to_string(),
        (TextFormat::Html, _) => html_to_text(content),
        (_, TextFormat::Html) => markdown_to_html(content),
        _ => content.to_string(),
    })
}

static H3: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^### (.*)$").expect("valid regex"));
static H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^## (.*)$").expect("valid regex"));
static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^# (.*)$").expect("valid regex"));
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("valid regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").expect("valid regex"));
static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(.*?)```").expect("valid regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").expect("valid regex"));

/// Headings, emphasis, links and code only.
fn markdown_to_html(markdown: &str) -> String {
    let mut html = H3.replace_all(markdown, "<h3>${1}</h3>").into_owned();
    html = H2.replace_all(&html, "<h2>${1}</h2>").into_owned();
    html = H1.replace_all(&html, "<h1>${1}</h1>").into_owned();
    html = BOLD.replace_all(&html, "<strong>${1}</strong>").into_owned();
    html = ITALIC.replace_all(&html, "<em>${1}</em>").into_owned();
    html = LINK.replace_all(&html, r#"<a href="${2}">${1}</a>"#).into_owned();
    html = CODE_BLOCK.replace_all(&html, "<pre><code>${1}</code></pre>").into_owned();
    html = INLINE_CODE.replace_all(&html, "<code>${1}</code>").into_owned();

    let body = format!("<p>{}</p>", html.replace("\n\n", "</p><p>")).replace("<p></p>", "");
    format!("<!DOCTYPE html><html><body>{}</body></html>", body)
}

fn load(r: &mut Registrar<'_>) -> anyhow::Result<()> {
    r.register(
        "convert_document",
        typed(convert_document),
        json!({
            "type": "function",
            "function": {
                "name": "convert_document",
                "description": "Convert a document between formats (txt, md, html, pdf, docx, rtf, odt). Uses pandoc when installed; without it only txt, md and html are supported",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "input_file": { "type": "string", "description": "Path to the document to convert" },
                        "output_format": {
                            "type": "string",
                            "description": "Target format",
                            "enum": FORMATS
                        },
                        "output_file": {
                            "type": "string",
                            "description": "Where to write the result (defaults to the input path with the new extension)"
                        }
                    },
                    "required": ["input_file", "output_format"]
                }
            }
        }),
    )?;
    Ok(())
}

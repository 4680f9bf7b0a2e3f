//! Sinks presenting a finished artifact to the user.

use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;

/// Receives the path of a freshly written artifact.
pub trait DocumentSink {
    fn display(&mut self, path: &Path) -> Result<()>;
}

impl DocumentSink for Vec<Box<dyn DocumentSink>> {
    fn display(&mut self, path: &Path) -> Result<()> {
        for sink in self.iter_mut() {
            sink.display(path)?;
        }
        Ok(())
    }
}

/// Prints a one-line confirmation to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusSink;

impl DocumentSink for StatusSink {
    fn display(&mut self, path: &Path) -> Result<()> {
        println!("Code files combined into {}", path.display());
        Ok(())
    }
}

/// Opens the artifact in the user's editor and waits for it to exit.
#[derive(Debug, Clone)]
pub struct EditorSink {
    program: String,
    args: Vec<String>,
}

impl EditorSink {
    /// Use `$VISUAL`, then `$EDITOR`. Values may carry arguments, e.g. `code --wait`.
    pub fn from_env() -> Result<Self> {
        let command = env::var("VISUAL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| env::var("EDITOR").ok().filter(|value| !value.trim().is_empty()))
            .context("neither $VISUAL nor $EDITOR is set")?;
        Self::from_command_line(&command)
    }

    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("empty editor command"))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl DocumentSink for EditorSink {
    fn display(&mut self, path: &Path) -> Result<()> {
        debug!(editor = %self.program, path = %path.display(), "opening artifact");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .with_context(|| format!("failed to launch editor: {}", self.program))?;
        if !status.success() {
            bail!("editor {} exited with status {status}", self.program);
        }
        Ok(())
    }
}

/// Copies the artifact's text to the system clipboard.
///
/// Uses the native clipboard when available and falls back to platform copy utilities in
/// headless sessions.
pub struct ClipboardSink {
    native: Option<arboard::Clipboard>,
}

impl ClipboardSink {
    pub fn new() -> Self {
        Self {
            native: arboard::Clipboard::new().ok(),
        }
    }

    fn copy(&mut self, text: &str) -> Result<()> {
        if let Some(native) = self.native.as_mut() {
            if native.set_text(text.to_owned()).is_ok() {
                return Ok(());
            }
        }

        self.native = None;
        for command in fallback_commands() {
            match pipe_to_command(command, text) {
                Ok(()) => return Ok(()),
                Err(err) => debug!(error = %err, "clipboard fallback failed"),
            }
        }
        Err(anyhow!("no clipboard backend accepted the artifact"))
    }
}

impl Default for ClipboardSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSink for ClipboardSink {
    fn display(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read artifact {}", path.display()))?;
        self.copy(&text).context("failed to copy artifact to clipboard")?;
        println!("Copied {} to clipboard", path.display());
        Ok(())
    }
}

fn pipe_to_command(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn clipboard command: {program}"))?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(text.as_bytes())
            .context("failed to write clipboard contents")?;
    }

    let status = child
        .wait()
        .with_context(|| format!("clipboard command did not exit cleanly: {program}"))?;
    if !status.success() {
        bail!("clipboard command {program} exited with status {status}");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["wl-copy"], &["xclip", "-selection", "clipboard"], &["xsel", "-b", "-i"]]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["clip.exe"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}

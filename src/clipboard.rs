use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};

pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<()>;
    fn name(&self) -> &str;
}

// --- System clipboard (shells out to a copy utility) ---

/// Known copy utilities, in order of preference.
const PROGRAMS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
];

#[derive(Debug)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Clipboard for CommandClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to run '{}'", self.program))?;

        child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("No stdin for '{}'", self.program))?
            .write_all(text.as_bytes())
            .with_context(|| format!("Failed to write to '{}'", self.program))?;

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for '{}'", self.program))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("{} failed: {}", self.program, stderr.trim()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Used when no copy utility is installed; every copy fails.
#[derive(Debug, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&self, _text: &str) -> Result<()> {
        Err(anyhow!(
            "No clipboard utility found (install wl-copy, xclip, xsel or pbcopy)"
        ))
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Picks the first known copy utility present on `PATH`.
pub fn detect_clipboard() -> Box<dyn Clipboard> {
    let path = std::env::var_os("PATH").unwrap_or_default();
    let dirs: Vec<_> = std::env::split_paths(&path).collect();

    for (program, args) in PROGRAMS {
        if dirs.iter().any(|dir| dir.join(program).is_file()) {
            tracing::debug!(program, "using clipboard utility");
            return Box::new(CommandClipboard::new(program, args));
        }
    }
    Box::new(NoClipboard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_clipboard_always_fails() {
        assert!(NoClipboard.copy("x").is_err());
        assert_eq!(NoClipboard.name(), "none");
    }

    #[test]
    fn test_missing_program_reports_error() {
        let clipboard = CommandClipboard::new("jobhunt-definitely-not-a-program", &[]);
        assert!(clipboard.copy("hello").is_err());
    }
}

use anyhow::{bail, Context, Result};
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

/// Resolve the editor command: `$VISUAL`, then `$EDITOR`, then `vi`.
pub fn editor_command() -> String {
    std::env::var("VISUAL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| std::env::var("EDITOR").ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_string())
}

/// Open `text` in an external editor and return the edited text, or `None` if
/// it was left unchanged. The caller must release the terminal first.
pub fn edit_text(editor: &str, text: &str) -> Result<Option<String>> {
    let mut file = NamedTempFile::new().context("Failed to create temporary file")?;
    file.write_all(text.as_bytes())
        .context("Failed to write temporary file")?;
    file.flush()?;

    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor: {}", editor))?;

    if !status.success() {
        bail!("Editor exited with {}", status);
    }

    let edited = std::fs::read_to_string(file.path())
        .context("Failed to read edited file")?;

    Ok((edited != text).then_some(edited))
}

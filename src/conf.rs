//! Line-oriented input.conf parsing and serialization
//!
//! One binding per line: `<trigger><whitespace><action>[#comment]`. Blank
//! lines and `#` comment lines are skipped. Lines opening with the extended
//! command prefix carry commands in the host application's syntax rather than
//! the embedded engine's. Malformed lines are dropped silently (debug log
//! only), never fatal; the only hard failure is a file exceeding the line cap.

use std::fmt;
use std::path::Path;

use crate::binding::KeyBinding;

/// Prefix marking a line whose action uses the host application's extended
/// command syntax. Must stay byte-compatible with existing user files.
pub const EXTENDED_COMMAND_PREFIX: &str = "#@iina";

/// Default cap on lines read from one config file. Exceeding it aborts the
/// whole load so the caller can fall back to its prior known-good state.
pub const DEFAULT_MAX_LINES: usize = 10_000;

/// Errors from loading or writing a config file
#[derive(Debug, Clone)]
pub enum ConfError {
    IoError(String),
    /// The file exceeded the line cap; nothing was loaded
    TooManyLines { max: usize },
}

impl fmt::Display for ConfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfError::IoError(e) => write!(f, "IO error: {}", e),
            ConfError::TooManyLines { max } => {
                write!(f, "config file exceeds the {} line limit", max)
            }
        }
    }
}

impl std::error::Error for ConfError {}

/// Parse one config line into a binding.
///
/// Returns `None` for blank lines, comment lines, and malformed lines (no
/// whitespace-separated action token). The returned binding carries no
/// `source_line`; [`parse_text`] fills that in.
pub fn parse_line(raw: &str) -> Option<KeyBinding> {
    let mut line = raw.trim();
    if line.is_empty() {
        return None;
    }

    let mut is_extended = false;
    if let Some(rest) = line.strip_prefix(EXTENDED_COMMAND_PREFIX) {
        is_extended = true;
        line = rest.trim_start();
    } else if line.starts_with('#') {
        return None;
    }

    let (trigger_raw, rest) = match line.split_once(char::is_whitespace) {
        Some((t, r)) => (t, r.trim_start()),
        None => {
            tracing::debug!(line = raw, "skipping config line with no action");
            return None;
        }
    };

    let (action, comment) = split_trailing_comment(rest);
    let action = action.trim();
    if trigger_raw.is_empty() || action.is_empty() {
        tracing::debug!(line = raw, "skipping config line with empty trigger or action");
        return None;
    }

    let mut binding = KeyBinding::new(trigger_raw, action).extended(is_extended);
    if let Some(comment) = comment {
        binding = binding.with_comment(comment);
    }
    Some(binding)
}

/// Split action text at the first unescaped `#`; the remainder (trimmed) is
/// the trailing comment. `\#` inside the action is left as-is.
fn split_trailing_comment(text: &str) -> (&str, Option<String>) {
    let bytes = text.as_bytes();
    for i in 0..bytes.len() {
        if bytes[i] == b'#' && (i == 0 || bytes[i - 1] != b'\\') {
            let comment = text[i + 1..].trim();
            let comment = (!comment.is_empty()).then(|| comment.to_string());
            return (&text[..i], comment);
        }
    }
    (text, None)
}

/// Parse a whole config file body with the default line cap
pub fn parse_text(text: &str) -> Result<Vec<KeyBinding>, ConfError> {
    parse_text_with_limit(text, DEFAULT_MAX_LINES)
}

/// Parse a whole config file body, assigning 1-based source line numbers.
///
/// If the file has more than `max_lines` lines the load is aborted with an
/// error and no partial result is returned.
pub fn parse_text_with_limit(text: &str, max_lines: usize) -> Result<Vec<KeyBinding>, ConfError> {
    let mut bindings = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if idx >= max_lines {
            tracing::warn!(max_lines, "aborting config load: too many lines");
            return Err(ConfError::TooManyLines { max: max_lines });
        }
        if let Some(binding) = parse_line(line) {
            bindings.push(binding.with_source_line(idx as u32 + 1));
        }
    }
    Ok(bindings)
}

/// Serialize bindings back into config lines.
///
/// Every emitted line is checked to re-parse into an equivalent binding;
/// bindings that fail this round-trip (for example an action containing an
/// unescaped `#`) are dropped with a warning rather than corrupting the file.
pub fn serialize(bindings: &[KeyBinding]) -> Vec<String> {
    let mut lines = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let line = render_line(binding);
        match parse_line(&line) {
            Some(reparsed) if reparsed.equivalent_to(binding) => lines.push(line),
            _ => {
                tracing::warn!(
                    trigger = %binding.trigger,
                    action = %binding.action,
                    "dropping binding that does not survive a parse round-trip"
                );
            }
        }
    }
    lines
}

fn render_line(binding: &KeyBinding) -> String {
    let mut line = String::new();
    if binding.is_extended_command {
        line.push_str(EXTENDED_COMMAND_PREFIX);
        line.push(' ');
    }
    line.push_str(&binding.trigger);
    line.push(' ');
    line.push_str(&binding.action);
    if let Some(comment) = &binding.comment {
        line.push_str("   # ");
        line.push_str(comment);
    }
    line
}

/// Read and parse a config file (loader collaborator convenience)
pub fn load_conf_file(path: &Path) -> Result<Vec<KeyBinding>, ConfError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfError::IoError(e.to_string()))?;
    parse_text(&content)
}

/// Serialize bindings and write them to a config file
pub fn write_conf_file(path: &Path, bindings: &[KeyBinding]) -> Result<(), ConfError> {
    let mut body = serialize(bindings).join("\n");
    body.push('\n');
    std::fs::write(path, body).map_err(|e| ConfError::IoError(e.to_string()))
}

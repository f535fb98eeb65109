//! Line rendering for the three output formats.
//!
//! Each record is rendered into one `String` and handed to stderr with a
//! single write, so lines from concurrent pool operations never interleave.

use crate::config::{LogConfig, config, is_enabled};
use crate::level::{Format, Level};
use std::fmt::Write as _;
use std::io::Write as _;

/// Write one line at `level` for `target` to stderr.
#[doc(hidden)]
pub fn emit(level: Level, target: &str, message: &str) {
    if !is_enabled(level) {
        return;
    }

    let mut line = render(level, target, message, config());
    line.push('\n');
    let _ = std::io::stderr().lock().write_all(line.as_bytes());
}

/// Render a record without the trailing newline.
pub(crate) fn render(level: Level, target: &str, message: &str, config: &LogConfig) -> String {
    match config.format {
        Format::Pretty => pretty_line(level, target, message, config),
        Format::Compact => compact_line(level, target, message, config),
        Format::Json => json_line(level, target, message),
    }
}

fn pretty_line(level: Level, target: &str, message: &str, config: &LogConfig) -> String {
    let mut line = String::with_capacity(message.len() + 48);

    if config.timestamps {
        let _ = write!(line, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    #[cfg(feature = "color")]
    let _ = if config.color {
        write!(line, "{:5} ", level.colored())
    } else {
        write!(line, "{:5} ", level.as_str())
    };
    #[cfg(not(feature = "color"))]
    let _ = write!(line, "{:5} ", level.as_str());

    if config.module_path && !target.is_empty() {
        let _ = write!(line, "[{target}] ");
    }
    line.push_str(message);
    line
}

fn compact_line(level: Level, target: &str, message: &str, config: &LogConfig) -> String {
    let mut line = String::with_capacity(message.len() + 24);

    if config.timestamps {
        let _ = write!(line, "{} ", chrono::Local::now().format("%H:%M:%S"));
    }
    line.push(level.as_str().chars().next().unwrap_or('?'));
    line.push(' ');
    if config.module_path && !target.is_empty() {
        let _ = write!(line, "{target}: ");
    }
    line.push_str(message);
    line
}

#[cfg(feature = "json")]
pub(crate) fn json_line(level: Level, target: &str, message: &str) -> String {
    let entry = serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "level": level.as_str(),
        "target": target,
        "message": message,
    });
    entry.to_string()
}

// Hand-escaped fallback when serde_json is not compiled in.
#[cfg(not(feature = "json"))]
pub(crate) fn json_line(level: Level, target: &str, message: &str) -> String {
    let mut line = String::with_capacity(message.len() + 96);
    let _ = write!(
        line,
        "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"target\":\"",
        chrono::Utc::now().to_rfc3339(),
        level.as_str()
    );
    push_escaped(&mut line, target);
    line.push_str("\",\"message\":\"");
    push_escaped(&mut line, message);
    line.push_str("\"}");
    line
}

#[cfg(not(feature = "json"))]
fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
}

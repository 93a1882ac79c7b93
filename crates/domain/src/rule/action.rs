//! Action: what a rule does when its change filter passes.

use serde::{Deserialize, Serialize};

use crate::change::CellChange;

/// A single step executed by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Emit a diagnostic line.
    Log {
        #[serde(default)]
        level: LogLevel,
        message: String,
    },
    /// Publish a message through the outbound transport.
    Publish {
        topic: String,
        #[serde(default = "default_payload")]
        payload: String,
        #[serde(default)]
        retain: bool,
    },
}

fn default_payload() -> String {
    "{new_code}".to_string()
}

/// Severity of a [`RuleAction::Log`] line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Expand change placeholders in a template.
///
/// Known placeholders: `{device}`, `{cell}`, `{old}`, `{new}`, `{old_code}`,
/// `{new_code}` and `{at}` (RFC 3339). Anything else is left untouched.
/// Substituted values are never expanded again.
#[must_use]
pub fn render(template: &str, change: &CellChange) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let expanded = tail
            .find('}')
            .and_then(|end| placeholder(&tail[1..end], change).map(|value| (value, end)));
        match expanded {
            Some((value, end)) => {
                out.push_str(&value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn placeholder(name: &str, change: &CellChange) -> Option<String> {
    let value = match name {
        "device" => change.cell.device.as_str().to_string(),
        "cell" => change.cell.cell.as_str().to_string(),
        "old" => change.old.as_str().to_string(),
        "new" => change.new.as_str().to_string(),
        "old_code" => change.old.code().to_string(),
        "new_code" => change.new.code().to_string(),
        "at" => change.at.to_rfc3339(),
        _ => return None,
    };
    Some(value)
}

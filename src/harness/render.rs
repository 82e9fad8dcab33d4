//! Turns outcomes and log entries into display lines.

use super::{LogEntry, Outcome};

/// Display lines for an outcome. A failure is always a single `kind: message` line.
pub fn render(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Success(lines) => lines.clone(),
        Outcome::Failure { kind, message } if message.is_empty() => vec![kind.to_string()],
        Outcome::Failure { kind, message } => vec![format!("{kind}: {message}")],
    }
}

/// `[HH:MM:SS] text`
pub fn render_entry(entry: &LogEntry) -> String {
    format!("[{}] {}", entry.timestamp.format("%H:%M:%S"), entry.text)
}

/// Shortens a secret for display, e.g. a JWT, keeping the first `keep` chars.
pub fn truncate_secret(secret: &str, keep: usize) -> String {
    match secret.char_indices().nth(keep) {
        Some((idx, _)) => format!("{}...", &secret[..idx]),
        None => secret.to_string(),
    }
}

//! Pretty-printing helpers for diagnostics

use serde_json::Value;
use tracing::{info, warn};

/// Bodies longer than this are truncated by [`format_body`]
pub const MAX_BODY_DISPLAY: usize = 256 * 1024;

const RULE: &str = "++++++++++++++++++++++++++++++++++++++++";

/// Indented JSON with sorted keys
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Single-line JSON with sorted keys
pub fn compact(value: &Value) -> String {
    value.to_string()
}

/// Log a value in its pretty form between rule lines
pub fn log_pretty(value: &Value) {
    info!("{}", RULE);
    info!("\n{}", pretty(value));
    info!("{}", RULE);
}

/// Render a response body for logging.
///
/// JSON bodies are re-serialized on one line; bodies over
/// [`MAX_BODY_DISPLAY`] bytes are cut short with a marker prefix. Text that
/// is not JSON comes back unchanged.
pub fn format_body(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            let rendered = compact(&value);
            if text.len() <= MAX_BODY_DISPLAY {
                rendered
            } else {
                format!(
                    "RESPONSE CONTENT TOO LONG TO DISPLAY, FOR SHORT(256 KByte): {}",
                    truncate_at_boundary(&rendered, MAX_BODY_DISPLAY)
                )
            }
        }
        Err(e) => {
            warn!("Response body is not JSON ({}), using raw text instead", e);
            text.to_string()
        }
    }
}

fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

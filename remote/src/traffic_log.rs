//! Traffic logging for Remote API calls
//!
//! Summaries go to the `traffic` tracing target. Bodies are truncated so
//! post content does not end up in logs wholesale.

use tracing::{debug, warn};

/// Maximum characters to log for a body
const MAX_CONTENT_LOG_CHARS: usize = 200;

/// Truncate a string for logging, adding ellipsis if truncated
pub fn truncate_for_log(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars total)", truncated, char_count)
    }
}

pub fn log_request(endpoint: &str, url: &str) {
    debug!(target: "traffic", endpoint, url, "REQUEST");
}

pub fn log_response(endpoint: &str, response: &impl serde::Serialize) {
    let json = serde_json::to_string(response).unwrap_or_else(|_| "<serialization error>".to_string());
    let summary = truncate_for_log(&json, MAX_CONTENT_LOG_CHARS);
    debug!(target: "traffic", endpoint, summary = %summary, "RESPONSE");
}

pub fn log_error(endpoint: &str, error: &str) {
    warn!(target: "traffic", endpoint, error, "ERROR");
}

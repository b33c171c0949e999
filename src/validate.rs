//! Input validation helpers.
//!
//! # Purpose
//! Pure checks for topic names and subscriber callback URLs. Handlers reject
//! invalid input with a 400 before any store call; malformed URLs are
//! validation failures, never errors.
use url::Url;

/// A topic is valid when it contains at least one non-whitespace character.
pub fn topic_is_valid(topic: &str) -> bool {
    !topic.trim().is_empty()
}

/// A callback URL is valid when it parses and its scheme is exactly
/// `http` or `https`.
///
/// Parse failures return `false` rather than propagating; the caller only
/// needs the yes/no answer.
pub fn is_valid_http_url(candidate: &str) -> bool {
    if candidate.trim().is_empty() {
        return false;
    }
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(err) => {
            tracing::debug!(candidate, error = %err, "url failed to parse");
            false
        }
    }
}

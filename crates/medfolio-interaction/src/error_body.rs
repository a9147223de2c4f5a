//! Turning error responses into human-readable messages.
//!
//! FastAPI-style bodies put the message under `detail`, which may be a
//! string, an object with `error`/`message`, or a list of validation
//! entries. Other services use a top-level `error` or `message`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static SECONDS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:s\b|sec\b|secs\b|second|seconds)").expect("valid regex")
});

const COOLDOWN_KEYS: &[&str] = &["retry_after", "cooldown_remaining", "cooldown_seconds"];

/// Best-effort message for a non-2xx response.
///
/// Falls back to the status' canonical reason, then to a generic
/// `Request failed (<code>)`.
pub fn error_message(status: u16, reason: Option<&str>, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = message_from_value(&value) {
            return message;
        }
    }
    match reason {
        Some(reason) if !reason.is_empty() => reason.to_string(),
        _ => format!("Request failed ({status})"),
    }
}

fn message_from_value(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if let Some(detail) = object.get("detail") {
        if let Some(message) = detail_message(detail) {
            return Some(message);
        }
    }
    ["error", "message"]
        .iter()
        .find_map(|key| object.get(*key).and_then(non_empty_str))
}

fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(_) => non_empty_str(detail),
        Value::Object(map) => ["error", "message", "msg"]
            .iter()
            .find_map(|key| map.get(*key).and_then(non_empty_str)),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(map) => map.get("msg").and_then(non_empty_str),
                    other => non_empty_str(other),
                })
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Seconds until a retry is allowed.
///
/// Structured fields win (top level or inside `detail`), then the
/// `Retry-After` header, then a number followed by a seconds unit in the
/// message text.
pub fn cooldown_seconds(
    body: &str,
    retry_after_header: Option<&str>,
    message: &str,
) -> Option<u64> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(seconds) = structured_cooldown(&value) {
            return Some(seconds);
        }
    }
    if let Some(seconds) = retry_after_header.and_then(|h| h.trim().parse::<u64>().ok()) {
        return Some(seconds);
    }
    SECONDS_PATTERN
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn structured_cooldown(value: &Value) -> Option<u64> {
    let scopes = [Some(value), value.get("detail")];
    scopes.into_iter().flatten().find_map(|scope| {
        COOLDOWN_KEYS
            .iter()
            .find_map(|key| scope.get(*key).and_then(as_seconds))
    })
}

fn as_seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.ceil() as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        let body = r#"{"detail":"Incorrect email or password"}"#;
        assert_eq!(
            error_message(401, Some("Unauthorized"), body),
            "Incorrect email or password"
        );
    }

    #[test]
    fn test_detail_object_with_error() {
        let body = r#"{"detail":{"error":"File too large (max 5MB)."}}"#;
        assert_eq!(error_message(400, Some("Bad Request"), body), "File too large (max 5MB).");
    }

    #[test]
    fn test_validation_list_is_joined() {
        let body = r#"{"detail":[
            {"loc":["body","email"],"msg":"value is not a valid email address"},
            {"msg":"field required"}
        ]}"#;
        assert_eq!(
            error_message(422, None, body),
            "value is not a valid email address; field required"
        );
    }

    #[test]
    fn test_top_level_error_field() {
        let body = r#"{"error":"File not found","file_id":"abc"}"#;
        assert_eq!(error_message(404, Some("Not Found"), body), "File not found");
    }

    #[test]
    fn test_unstructured_body_falls_back_to_reason() {
        assert_eq!(
            error_message(502, Some("Bad Gateway"), "<html>upstream</html>"),
            "Bad Gateway"
        );
        assert_eq!(error_message(599, None, ""), "Request failed (599)");
    }

    #[test]
    fn test_structured_cooldown_wins() {
        let message = "Retry available in 45 seconds";
        let body = r#"{"detail":{
            "error": "Retry available in 45 seconds",
            "cooldown_remaining": 12
        }}"#;
        assert_eq!(cooldown_seconds(body, Some("30"), message), Some(12));
    }

    #[test]
    fn test_header_then_text_fallback() {
        assert_eq!(cooldown_seconds("{}", Some("30"), "slow down"), Some(30));
        let message = "Please wait 45s before retrying";
        let body = r#"{"detail":"Please wait 45s before retrying"}"#;
        assert_eq!(cooldown_seconds(body, None, message), Some(45));
        assert_eq!(cooldown_seconds("{}", None, "Extraction already running"), None);
    }
}

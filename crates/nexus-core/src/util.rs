//! Small helpers shared by the remote client and the note services.

use chrono::{DateTime, Utc};

/// Trimmed text, or `None` when nothing is left
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Whether a remote URL already carries a scheme
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

const ERROR_EXCERPT_CHARS: usize = 180;

/// Leading slice of a response body, for error messages
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(ERROR_EXCERPT_CHARS).collect()
}

/// Next value of a record's sync clock.
///
/// Never goes backwards for a record, even if the wall clock does.
pub fn next_sync_stamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    previous.map_or(now, |previous| now.max(previous))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn blank_key_normalizes_to_none() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some(" \t ".to_string())), None);
        assert_eq!(
            normalize_text_option(Some("  anon-key ".to_string())),
            Some("anon-key".to_string())
        );
    }

    #[test]
    fn remote_urls_need_a_scheme() {
        assert!(is_http_url("https://abc.supabase.co"));
        assert!(is_http_url("http://127.0.0.1:54321"));
        assert!(!is_http_url("abc.supabase.co"));
    }

    #[test]
    fn compact_text_caps_error_bodies() {
        let body = format!("  {}", "x".repeat(500));
        assert_eq!(compact_text(&body).len(), ERROR_EXCERPT_CHARS);
    }

    #[test]
    fn next_sync_stamp_never_moves_backwards() {
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(next_sync_stamp(Some(future)), future);

        let past = Utc::now() - Duration::hours(1);
        assert!(next_sync_stamp(Some(past)) > past);
    }
}

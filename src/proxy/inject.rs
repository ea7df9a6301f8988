//! Best-effort script injection for HTML responses.
//!
//! This is a byte-level scan rather than an HTML parser: re-serializing
//! arbitrary upstream markup risks corrupting it, while missing an exotic
//! document shape only costs the injected script. No closing body tag means
//! no injection.

use axum::http::HeaderValue;
use bytes::Bytes;

const CLOSING_BODY_TAG: &[u8] = b"</body>";

/// Substring match on the literal Content-Type value, not full MIME parsing.
/// A missing or unreadable header counts as non-HTML.
pub fn is_html(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}

/// Insert `tag` immediately before the last closing body tag, matched
/// case-insensitively. Bodies without one come back unchanged.
pub fn inject_script(body: Bytes, tag: &str) -> Bytes {
    match rfind_tag(&body) {
        Some(idx) => {
            let mut out = Vec::with_capacity(body.len() + tag.len());
            out.extend_from_slice(&body[..idx]);
            out.extend_from_slice(tag.as_bytes());
            out.extend_from_slice(&body[idx..]);
            Bytes::from(out)
        }
        None => body,
    }
}

fn rfind_tag(haystack: &[u8]) -> Option<usize> {
    if haystack.len() < CLOSING_BODY_TAG.len() {
        return None;
    }
    (0..=haystack.len() - CLOSING_BODY_TAG.len())
        .rev()
        .find(|&i| haystack[i..i + CLOSING_BODY_TAG.len()].eq_ignore_ascii_case(CLOSING_BODY_TAG))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = r#"<script src="/static/injection.js"></script>"#;

    #[test]
    fn test_is_html_matches_with_charset() {
        assert!(is_html(Some(&HeaderValue::from_static(
            "text/html; charset=utf-8"
        ))));
        assert!(is_html(Some(&HeaderValue::from_static("TEXT/HTML"))));
        assert!(!is_html(Some(&HeaderValue::from_static("application/json"))));
        assert!(!is_html(None));
    }

    #[test]
    fn test_injects_before_closing_body() {
        let body = Bytes::from_static(b"<html><body>Hello</body></html>");
        let out = inject_script(body, TAG);
        assert_eq!(
            out,
            format!("<html><body>Hello{TAG}</body></html>").as_bytes()
        );
    }

    #[test]
    fn test_injects_case_insensitive() {
        let body = Bytes::from_static(b"<HTML><BODY>Hi</BODY></HTML>");
        let out = inject_script(body, TAG);
        assert_eq!(out, format!("<HTML><BODY>Hi{TAG}</BODY></HTML>").as_bytes());
    }

    #[test]
    fn test_injects_before_last_occurrence() {
        let body = Bytes::from_static(b"<body>a</body><body>b</body>");
        let out = inject_script(body, TAG);
        assert_eq!(out, format!("<body>a</body><body>b{TAG}</body>").as_bytes());
    }

    #[test]
    fn test_no_closing_tag_leaves_body_untouched() {
        let body = Bytes::from_static(b"<p>fragment without a body tag</p>");
        let out = inject_script(body.clone(), TAG);
        assert_eq!(out, body);
    }

    #[test]
    fn test_short_body_leaves_untouched() {
        let body = Bytes::from_static(b"ok");
        assert_eq!(inject_script(body.clone(), TAG), body);
    }
}

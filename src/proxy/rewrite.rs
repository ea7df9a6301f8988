//! Response header and cookie rewriting.

use axum::http::{header, HeaderMap, HeaderValue};

/// Upstream headers that never reach the client. They describe the
/// upstream's transport framing or a policy computed against the original
/// body, and both stop being true once the body is buffered and possibly
/// mutated by the injector.
pub const EXCLUDED_HEADERS: [&str; 5] = [
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "connection",
    "content-security-policy",
];

fn is_excluded(name: &str) -> bool {
    EXCLUDED_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Rewrite a root-relative redirect target so it stays under the proxy
/// prefix. Absolute URLs and non-rooted values pass through unchanged.
pub fn rewrite_location(location: &str, prefix: &str) -> String {
    if location.starts_with('/') {
        format!("{prefix}{location}")
    } else {
        location.to_string()
    }
}

/// Force the cookie's `Path` attribute to the proxy prefix so the browser
/// scopes it to this one service, appending the attribute when the upstream
/// omitted it. Every other attribute passes through untouched.
pub fn rewrite_set_cookie(value: &str, prefix: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut found_path = false;
    for part in value.split(';') {
        if part.trim_start().to_ascii_lowercase().starts_with("path=") {
            found_path = true;
            let ws = &part[..part.len() - part.trim_start().len()];
            parts.push(format!("{ws}Path={prefix}"));
        } else {
            parts.push(part.to_string());
        }
    }
    if !found_path {
        parts.push(format!(" Path={prefix}"));
    }
    parts.join(";")
}

/// Build the client-facing header map from an upstream response.
///
/// Multi-valued headers, notably `Set-Cookie`, stay as separate entries in
/// their original order; each value is rewritten independently. Header
/// values that are not valid UTF-8 are passed through as-is rather than
/// dropped.
pub fn response_headers(upstream: &HeaderMap, prefix: &str) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream.iter() {
        if is_excluded(name.as_str()) {
            continue;
        }
        let rewritten = if name == header::LOCATION {
            value
                .to_str()
                .ok()
                .map(|v| rewrite_location(v, prefix))
                .and_then(|v| HeaderValue::from_str(&v).ok())
        } else if name == header::SET_COOKIE {
            value
                .to_str()
                .ok()
                .map(|v| rewrite_set_cookie(v, prefix))
                .and_then(|v| HeaderValue::from_str(&v).ok())
        } else {
            None
        };
        out.append(name.clone(), rewritten.unwrap_or_else(|| value.clone()));
    }
    out
}

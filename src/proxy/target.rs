//! Target URL composition.

/// Join a service base URL with the request's remaining path, appending the
/// raw query string when present. An empty subpath resolves to the base root.
pub fn http_target(base_url: &str, subpath: &str, query: Option<&str>) -> String {
    let mut target = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        subpath.trim_start_matches('/')
    );
    if let Some(query) = query {
        if !query.is_empty() {
            target.push('?');
            target.push_str(query);
        }
    }
    target
}

/// Same join as [`http_target`], with the scheme translated for WebSocket.
/// Unrecognized schemes pass through untouched.
pub fn ws_target(base_url: &str, subpath: &str) -> String {
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    };
    format!(
        "{}/{}",
        ws_base.trim_end_matches('/'),
        subpath.trim_start_matches('/')
    )
}

//! Protocol-forwarding engine: target URL composition, the upstream HTTP
//! client, and the response transformations that keep a proxied service
//! usable as if it were same-origin.

pub mod forward;
pub mod inject;
pub mod rewrite;
pub mod target;

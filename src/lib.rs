//! hubarr — a single-origin gateway for self-hosted services.
//!
//! Routes `{mount}/{service}/{path}` to registered upstream services,
//! rewriting redirect targets and cookie scope so a browser can use each
//! service as if it were same-origin, and injecting the remote-navigation
//! script into HTML pages on the way back.

pub mod api;
pub mod config;
pub mod db;
pub mod proxy;
pub mod registry;
pub mod utils;

pub use db::DbPool;

use std::sync::Arc;

use crate::config::Config;
use crate::proxy::forward::Forwarder;
use crate::registry::ServiceLookup;

/// Shared application state, passed to every handler.
pub struct AppState {
    pub config: Config,
    pub registry: Arc<dyn ServiceLookup>,
    pub forwarder: Forwarder,
}

impl AppState {
    pub fn new(config: Config, registry: Arc<dyn ServiceLookup>) -> Self {
        Self {
            config,
            registry,
            forwarder: Forwarder::new(),
        }
    }
}

//! Service registry access.
//!
//! The registry data is owned by the companion admin application; the
//! gateway only resolves names. Lookups always hit the backing store, so a
//! service disabled by the admin takes effect on the very next request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

use crate::db::DbPool;

/// A registered upstream service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceDescriptor {
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
}

/// Resolves service names to descriptors.
#[async_trait]
pub trait ServiceLookup: Send + Sync {
    /// Resolve a service by name. `Ok(None)` means the name is unknown;
    /// callers must additionally check `enabled`.
    async fn lookup(&self, name: &str) -> anyhow::Result<Option<ServiceDescriptor>>;
}

/// SQLite-backed registry, the production implementation.
pub struct SqliteRegistry {
    pool: DbPool,
}

impl SqliteRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceLookup for SqliteRegistry {
    async fn lookup(&self, name: &str) -> anyhow::Result<Option<ServiceDescriptor>> {
        let service = sqlx::query_as::<_, ServiceDescriptor>(
            "SELECT name, base_url, enabled FROM proxy_services WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }
}

/// Fixed in-memory registry for tests and embedded setups.
#[derive(Default)]
pub struct StaticRegistry {
    services: HashMap<String, ServiceDescriptor>,
}

impl StaticRegistry {
    pub fn new(services: impl IntoIterator<Item = ServiceDescriptor>) -> Self {
        Self {
            services: services
                .into_iter()
                .map(|s| (s.name.clone(), s))
                .collect(),
        }
    }
}

#[async_trait]
impl ServiceLookup for StaticRegistry {
    async fn lookup(&self, name: &str) -> anyhow::Result<Option<ServiceDescriptor>> {
        Ok(self.services.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str, enabled: bool) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.to_string(),
            base_url: format!("http://{name}.local:8989"),
            enabled,
        }
    }

    #[tokio::test]
    async fn test_static_registry_lookup() {
        let registry = StaticRegistry::new([descriptor("sonarr", true), descriptor("radarr", false)]);

        let found = registry.lookup("sonarr").await.unwrap().unwrap();
        assert_eq!(found.base_url, "http://sonarr.local:8989");
        assert!(found.enabled);

        let disabled = registry.lookup("radarr").await.unwrap().unwrap();
        assert!(!disabled.enabled);

        assert!(registry.lookup("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_registry_reads_live_rows() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE proxy_services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                base_url TEXT NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO proxy_services (name, base_url, enabled) VALUES (?, ?, 1)")
            .bind("jellyfin")
            .bind("http://127.0.0.1:8096")
            .execute(&pool)
            .await
            .unwrap();

        let registry = SqliteRegistry::new(pool.clone());
        let found = registry.lookup("jellyfin").await.unwrap().unwrap();
        assert_eq!(found.base_url, "http://127.0.0.1:8096");
        assert!(found.enabled);

        // A disable lands on the next lookup, nothing is cached
        sqlx::query("UPDATE proxy_services SET enabled = 0 WHERE name = ?")
            .bind("jellyfin")
            .execute(&pool)
            .await
            .unwrap();
        let found = registry.lookup("jellyfin").await.unwrap().unwrap();
        assert!(!found.enabled);
    }
}

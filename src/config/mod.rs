use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./static")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Path prefix the gateway routes are nested under
    #[serde(default = "default_mount")]
    pub mount: String,
    /// URL of the script injected into proxied HTML pages
    #[serde(default = "default_inject_script")]
    pub inject_script: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            mount: default_mount(),
            inject_script: default_inject_script(),
        }
    }
}

fn default_mount() -> String {
    "/api/proxy".to_string()
}

fn default_inject_script() -> String {
    "/static/injection.js".to_string()
}

impl ProxyConfig {
    /// Client-facing path prefix for a service, e.g. `/api/proxy/sonarr`.
    pub fn path_prefix(&self, service: &str) -> String {
        format!("{}/{}", self.mount, service)
    }

    /// The script tag inserted into HTML responses.
    pub fn injection_tag(&self) -> String {
        format!(r#"<script src="{}"></script>"#, self.inject_script)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            proxy: ProxyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.proxy.mount, "/api/proxy");
        assert_eq!(config.proxy.inject_script, "/static/injection.js");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [proxy]
            mount = "/gateway"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.proxy.mount, "/gateway");
        assert_eq!(config.proxy.inject_script, "/static/injection.js");
    }

    #[test]
    fn test_path_prefix_and_tag() {
        let proxy = ProxyConfig::default();
        assert_eq!(proxy.path_prefix("sonarr"), "/api/proxy/sonarr");
        assert_eq!(
            proxy.injection_tag(),
            r#"<script src="/static/injection.js"></script>"#
        );
    }
}

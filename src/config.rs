//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

// Re-export clustering config
pub use crate::cluster::ClusteringConfig;

/// Environment variable the original deployment used for the RPC URL
pub const LEGACY_RPC_ENV: &str = "ETH_RPC";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub rpc: RpcConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub estimates: EstimatesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_rpc_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Refuse to start the server if the endpoint is unreachable
    #[serde(default = "default_true")]
    pub require_connection: bool,
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

/// Placeholder estimate settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstimatesConfig {
    /// Fixed RNG seed; unset means OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_rpc_endpoint() -> String {
    "https://cloudflare-eth.com".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut builder = config::Config::builder()
            // Start with defaults
            .set_default("rpc.endpoint", default_rpc_endpoint())?
            .set_default("rpc.timeout_ms", default_timeout_ms() as i64)?
            .set_default("rpc.require_connection", true)?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix PERSONA_)
            .add_source(
                config::Environment::with_prefix("PERSONA")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(endpoint) = std::env::var(LEGACY_RPC_ENV) {
            if !endpoint.trim().is_empty() {
                builder = builder.set_override("rpc.endpoint", endpoint)?;
            }
        }

        let settings = builder.build().context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(self.rpc.endpoint.starts_with("http://") || self.rpc.endpoint.starts_with("https://")) {
            anyhow::bail!("rpc.endpoint must be an http(s) URL, got {}", mask_url(&self.rpc.endpoint));
        }

        if self.rpc.timeout_ms == 0 {
            anyhow::bail!("rpc.timeout_ms must be positive");
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }

        if self.clustering.n_init == 0 {
            anyhow::bail!("clustering.n_init must be at least 1");
        }

        if self.clustering.max_iter == 0 {
            anyhow::bail!("clustering.max_iter must be at least 1");
        }

        if !(self.clustering.tolerance >= 0.0) {
            anyhow::bail!("clustering.tolerance must be non-negative");
        }

        if self.estimates.seed.is_some() {
            tracing::warn!("estimates.seed is set - placeholder fields will repeat across restarts");
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  RPC:
    endpoint: {}
    timeout: {}ms
    require_connection: {}
  Server:
    bind: {}:{}
  Clustering:
    groups: {}
    seed: {}
    n_init: {}
    max_iter: {}
    tolerance: {}
  Estimates:
    seed: {}
"#,
            mask_url(&self.rpc.endpoint),
            self.rpc.timeout_ms,
            self.rpc.require_connection,
            self.server.host,
            self.server.port,
            crate::cluster::TARGET_GROUPS,
            self.clustering.seed,
            self.clustering.n_init,
            self.clustering.max_iter,
            self.clustering.tolerance,
            self.estimates
                .seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "(entropy)".to_string()),
        )
    }
}

/// Mask URL for display (hide API keys in query params or path)
fn mask_url(url: &str) -> String {
    let base = match url.find('?') {
        Some(idx) => return format!("{}?***", &url[..idx]),
        None => url,
    };

    // Hosted providers put the key in the last path segment (.../v2/<key>)
    let scheme_end = base.find("://").map(|i| i + 3).unwrap_or(0);
    match base[scheme_end..].find('/') {
        Some(path_start) => {
            let path = &base[scheme_end + path_start..];
            match path.rfind('/') {
                Some(last) if last + 1 < path.len() && path.len() - last - 1 >= 16 => {
                    format!("{}/***", &base[..scheme_end + path_start + last])
                }
                _ => base.to_string(),
            }
        }
        None => base.to_string(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcConfig {
                endpoint: default_rpc_endpoint(),
                timeout_ms: default_timeout_ms(),
                require_connection: true,
            },
            server: ServerConfig::default(),
            clustering: ClusteringConfig::default(),
            estimates: EstimatesConfig::default(),
        }
    }
}

//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{LogFormat, ServerConfig, StoreConfig, VirtualHostConfig, DEFAULT_VHOST};
use crate::error::Result;

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Live store settings
    pub store: Option<StoreSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
    /// Virtual hosts
    #[serde(default)]
    pub virtual_hosts: Vec<VirtualHostSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
    /// Virtual host used when the Host header matches nothing
    pub default_vhost: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Segments kept per stream
    pub max_segments_per_stream: Option<usize>,
    /// Largest accepted segment in MB
    pub max_segment_size_mb: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<LogFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualHostSettings {
    pub name: String,
    pub domains: Vec<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = StoreConfig::default();
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 3333,
                cors_enabled: Some(true),
                default_vhost: Some(DEFAULT_VHOST.to_string()),
            },
            store: Some(StoreSettings {
                max_segments_per_stream: Some(defaults.max_segments_per_stream),
                max_segment_size_mb: Some(defaults.max_segment_size_mb),
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some(LogFormat::Pretty),
            }),
            virtual_hosts: Vec::new(),
        }
    }

    /// Convert to ServerConfig
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = StoreConfig::default();
        let store = self.store.as_ref();
        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            cors_enabled: self.server.cors_enabled.unwrap_or(true),
            log_level: self
                .logging
                .as_ref()
                .map(|l| l.level.clone())
                .unwrap_or_else(|| "info".to_string()),
            log_format: self
                .logging
                .as_ref()
                .and_then(|l| l.format)
                .unwrap_or_default(),
            default_vhost: self
                .server
                .default_vhost
                .unwrap_or_else(|| DEFAULT_VHOST.to_string()),
            virtual_hosts: self
                .virtual_hosts
                .into_iter()
                .map(|v| VirtualHostConfig {
                    name: v.name,
                    domains: v.domains,
                })
                .collect(),
            store: StoreConfig {
                max_segments_per_stream: store
                    .and_then(|s| s.max_segments_per_stream)
                    .unwrap_or(defaults.max_segments_per_stream),
                max_segment_size_mb: store
                    .and_then(|s| s.max_segment_size_mb)
                    .unwrap_or(defaults.max_segment_size_mb),
            },
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    ConfigFile::default_config().to_file(path)
}

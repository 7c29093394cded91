//! Server configuration

use serde::{Deserialize, Serialize};

/// Name of the virtual host used when no configured domain matches
pub const DEFAULT_VHOST: &str = "default";

/// In-memory live store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of segments kept per stream (sliding live window)
    pub max_segments_per_stream: usize,

    /// Largest accepted segment upload in megabytes
    pub max_segment_size_mb: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_segments_per_stream: 10, // ~20 seconds of content at 2s/segment
            max_segment_size_mb: 16,
        }
    }
}

impl StoreConfig {
    /// Get the maximum segment size in bytes
    pub fn max_segment_size_bytes(&self) -> usize {
        self.max_segment_size_mb.saturating_mul(1024 * 1024)
    }
}

/// A named virtual host and the domains that map to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualHostConfig {
    pub name: String,

    /// Exact host names, or `*.example.com` wildcards
    pub domains: Vec<String>,
}

impl VirtualHostConfig {
    fn matches(&self, host: &str) -> bool {
        self.domains.iter().any(|domain| {
            if let Some(suffix) = domain.strip_prefix("*.") {
                let host = host.to_ascii_lowercase();
                host.ends_with(&format!(".{}", suffix.to_ascii_lowercase()))
            } else {
                domain.eq_ignore_ascii_case(host)
            }
        })
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Virtual host name for requests whose Host header matches nothing
    pub default_vhost: String,

    /// Configured virtual hosts, matched in order
    pub virtual_hosts: Vec<VirtualHostConfig>,

    /// Live store configuration
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3333,
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            default_vhost: DEFAULT_VHOST.to_string(),
            virtual_hosts: Vec::new(),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Map a `Host` header value to a virtual host name.
    pub fn resolve_vhost(&self, host_header: &str) -> &str {
        let host = strip_port(host_header.trim());
        if host.is_empty() {
            return &self.default_vhost;
        }

        self.virtual_hosts
            .iter()
            .find(|vhost| vhost.matches(host))
            .map(|vhost| vhost.name.as_str())
            .unwrap_or(self.default_vhost.as_str())
    }
}

// "[::1]:8080" -> "::1", "example.com:80" -> "example.com"
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    host.split(':').next().unwrap_or(host)
}

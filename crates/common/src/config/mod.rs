//! Configuration management for the Inkwell platform
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Canonical domain / subdomain handling
    pub domain: DomainConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Mail relay configuration
    pub mail: MailConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Discovery sidebar configuration
    pub sidebar: SidebarConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes)
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Apply the embedded schema DDL at startup
    #[serde(default)]
    pub apply_schema: bool,
}

/// Canonical-domain settings driving tenant resolution.
///
/// `server_name` takes precedence over `base_domain` when set; both may
/// carry a port, which is ignored for host comparison.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
    /// Public base domain all tenant subdomains hang off of
    #[serde(default = "default_base_domain")]
    pub base_domain: String,

    /// Development override (e.g. "localhost:8080")
    pub server_name: Option<String>,
}

impl DomainConfig {
    /// The domain incoming hosts are compared against, port stripped.
    pub fn canonical_domain(&self) -> &str {
        let raw = self
            .server_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.base_domain);
        raw.split(':').next().unwrap_or(raw)
    }

    /// Public URL of a tenant blog on the base domain.
    pub fn blog_url(&self, subdomain: &str) -> String {
        let domain = self.base_domain.split(':').next().unwrap_or(&self.base_domain);
        format!("http://{}.{}", subdomain, domain)
    }

    /// Public link to a post on a tenant blog, used for the shared index.
    pub fn post_link(&self, subdomain: &str, slug: &str) -> String {
        format!("{}/posts/{}", self.blog_url(subdomain), slug)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret for session token signing; generated at startup when unset
    pub session_secret: Option<String>,

    /// Session token expiration in seconds
    #[serde(default = "default_session_expiration")]
    pub session_expiration_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// HTTP mail relay endpoint; mail is disabled when unset
    pub relay_url: Option<String>,

    /// Sender address stamped on outgoing mail
    #[serde(default = "default_mail_sender")]
    pub sender: String,

    /// Relay request timeout in seconds
    #[serde(default = "default_mail_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second on anonymous write endpoints
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SidebarConfig {
    /// Trailing window for recent cross-tenant posts, in days
    #[serde(default = "default_sidebar_window")]
    pub window_days: i64,

    /// Cap on rows per sidebar dataset
    #[serde(default = "default_sidebar_limit")]
    pub limit: u64,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_connections() -> u32 { 50 }
fn default_min_connections() -> u32 { 5 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_base_domain() -> String { "example.com".to_string() }
fn default_session_expiration() -> u64 { 86400 }
fn default_mail_sender() -> String { "Inkwell <noreply@example.com>".to_string() }
fn default_mail_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_rate_limit() -> u32 { 5 }
fn default_burst() -> u32 { 10 }
fn default_enabled() -> bool { true }
fn default_sidebar_window() -> i64 { crate::SIDEBAR_WINDOW_DAYS }
fn default_sidebar_limit() -> u64 { crate::SIDEBAR_LIMIT }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Get the read database URL (falls back to primary)
    pub fn read_database_url(&self) -> &str {
        self.database.read_url.as_deref().unwrap_or(&self.database.url)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
                shutdown_timeout_secs: default_shutdown_timeout(),
            },
            database: DatabaseConfig {
                url: "mysql://localhost/inkwell".to_string(),
                read_url: None,
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
                connect_timeout_secs: default_connect_timeout(),
                idle_timeout_secs: default_idle_timeout(),
                apply_schema: false,
            },
            domain: DomainConfig {
                base_domain: default_base_domain(),
                server_name: None,
            },
            auth: AuthConfig {
                session_secret: None,
                session_expiration_secs: default_session_expiration(),
            },
            mail: MailConfig {
                relay_url: None,
                sender: default_mail_sender(),
                timeout_secs: default_mail_timeout(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: default_rate_limit(),
                burst: default_burst(),
                enabled: default_enabled(),
            },
            sidebar: SidebarConfig {
                window_days: default_sidebar_window(),
                limit: default_sidebar_limit(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.domain.base_domain, "example.com");
        assert!(!config.database.apply_schema);
    }

    #[test]
    fn test_read_database_fallback() {
        let config = AppConfig::default();
        assert_eq!(config.read_database_url(), "mysql://localhost/inkwell");
    }

    #[test]
    fn test_canonical_domain_prefers_server_name() {
        let mut domain = AppConfig::default().domain;
        assert_eq!(domain.canonical_domain(), "example.com");

        domain.server_name = Some("localhost:8080".to_string());
        assert_eq!(domain.canonical_domain(), "localhost");

        domain.server_name = Some(String::new());
        assert_eq!(domain.canonical_domain(), "example.com");
    }

    #[test]
    fn test_post_link_strips_port() {
        let domain = DomainConfig {
            base_domain: "example.com:8080".to_string(),
            server_name: None,
        };
        assert_eq!(
            domain.post_link("alice", "hello-world"),
            "http://alice.example.com/posts/hello-world"
        );
    }
}

//! Configuration types for the skiff data-access layer
//!
//! This module defines all configuration structures used throughout the
//! crate. Everything is plain serde data with validated defaults; no
//! configuration is read from ambient globals.

use serde::{Deserialize, Serialize};

/// Top-level configuration for an embedding application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkiffConfig {
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Fetch gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl SkiffConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            pagination: PaginationConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.pagination.validate()?;
        self.gateway.validate()?;
        Ok(())
    }
}

impl Default for SkiffConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when a view does not specify one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl PaginationConfig {
    /// Validate the pagination settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.default_page_size == 0 {
            return Err(crate::Error::config("default_page_size must be > 0"));
        }
        Ok(())
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

/// Fetch gateway settings
///
/// The version string tags both cache partitions; bumping it on an
/// application upgrade makes [`activate`](crate::policy::FetchGateway::activate)
/// discard every partition of the prior version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Application cache version tag (e.g. "v1.0.0")
    pub version: String,

    /// Asset URLs pre-populated into the static partition on install
    #[serde(default)]
    pub precache_assets: Vec<String>,

    /// Host substrings that bypass all caching (remote backend/API domains)
    #[serde(default)]
    pub bypass_hosts: Vec<String>,

    /// Path substrings served static-first
    #[serde(default = "default_static_path_patterns")]
    pub static_path_patterns: Vec<String>,

    /// Path substrings served stale-while-revalidate (locale data)
    #[serde(default = "default_locale_path_patterns")]
    pub locale_path_patterns: Vec<String>,

    /// Path extensions cached opportunistically under network-first
    #[serde(default = "default_asset_extensions")]
    pub asset_extensions: Vec<String>,

    /// URL of the cached offline placeholder page
    #[serde(default = "default_offline_url")]
    pub offline_url: String,

    /// Capacity of the gateway event channel
    ///
    /// When full, new events are dropped (with a warning log). This
    /// prevents unbounded memory growth when nobody drains the receiver.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl GatewayConfig {
    /// Create a gateway configuration for a version tag
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Name of the long-lived partition for this version
    pub fn static_partition(&self) -> String {
        format!("static-{}", self.version)
    }

    /// Name of the short-lived partition for this version
    pub fn dynamic_partition(&self) -> String {
        format!("dynamic-{}", self.version)
    }

    /// Validate the gateway settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.version.is_empty() {
            return Err(crate::Error::config("gateway version cannot be empty"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config(
                "event_channel_capacity must be > 0",
            ));
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: "v1.0.0".to_string(),
            precache_assets: Vec::new(),
            bypass_hosts: Vec::new(),
            static_path_patterns: default_static_path_patterns(),
            locale_path_patterns: default_locale_path_patterns(),
            asset_extensions: default_asset_extensions(),
            offline_url: default_offline_url(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_page_size() -> usize {
    20
}

fn default_static_path_patterns() -> Vec<String> {
    ["/css/", "/js/", "/favicon", "/logo"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_locale_path_patterns() -> Vec<String> {
    vec!["/translations/".to_string()]
}

fn default_asset_extensions() -> Vec<String> {
    [".png", ".jpg", ".svg", ".woff"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offline_url() -> String {
    "/offline.html".to_string()
}

fn default_event_channel_capacity() -> usize {
    1000
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Montandon configuration.
///
/// Loaded once at startup and handed to each component by reference; there
/// is no process-wide configuration global.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MontandonConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Apify maps search provider settings.
    #[serde(default)]
    pub apify: ApifyConfig,

    /// Evolution API messaging gateway settings.
    #[serde(default)]
    pub evolution: EvolutionConfig,

    /// Campaign dispatch pacing.
    #[serde(default)]
    pub campaign: CampaignConfig,

    /// Phone normalization settings.
    #[serde(default)]
    pub phone: PhoneConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path prefix for the versioned API routes.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_prefix: default_api_prefix(),
            cors_origins: default_cors_origins(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "montandon.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Apify configuration for the Google Maps crawler actor.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApifyConfig {
    /// Apify API token. `None` leaves search unusable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Actor identifier, `owner/name` form.
    #[serde(default = "default_actor_id")]
    pub actor_id: String,

    /// API base URL.
    #[serde(default = "default_apify_base_url")]
    pub base_url: String,

    /// Request timeout; the actor crawls synchronously, so this is generous.
    #[serde(default = "default_apify_timeout_secs")]
    pub timeout_secs: u64,

    /// Memory (MB) granted to the actor run.
    #[serde(default = "default_apify_memory_mb")]
    pub memory_mb: u32,

    /// Result language passed to the crawler.
    #[serde(default = "default_language")]
    pub language: String,

    /// Country the crawler prioritizes.
    #[serde(default = "default_country")]
    pub country_code: String,

    /// Map zoom level for the crawl.
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

impl Default for ApifyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            actor_id: default_actor_id(),
            base_url: default_apify_base_url(),
            timeout_secs: default_apify_timeout_secs(),
            memory_mb: default_apify_memory_mb(),
            language: default_language(),
            country_code: default_country(),
            zoom: default_zoom(),
        }
    }
}

impl std::fmt::Debug for ApifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApifyConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("actor_id", &self.actor_id)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("memory_mb", &self.memory_mb)
            .field("language", &self.language)
            .field("country_code", &self.country_code)
            .field("zoom", &self.zoom)
            .finish()
    }
}

fn default_actor_id() -> String {
    "compass/crawler-google-places".to_string()
}

fn default_apify_base_url() -> String {
    "https://api.apify.com/v2".to_string()
}

fn default_apify_timeout_secs() -> u64 {
    120
}

fn default_apify_memory_mb() -> u32 {
    4096
}

fn default_language() -> String {
    "pt-BR".to_string()
}

fn default_country() -> String {
    "br".to_string()
}

fn default_zoom() -> u8 {
    14
}

/// Evolution API configuration.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvolutionConfig {
    /// Base URL of the Evolution API server.
    #[serde(default = "default_evolution_base_url")]
    pub base_url: String,

    /// Name of the WhatsApp instance to send through.
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Global API key sent in the `apikey` header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// "Typing" presence shown before each message, in milliseconds.
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u32,

    /// Per-request timeout.
    #[serde(default = "default_evolution_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            base_url: default_evolution_base_url(),
            instance_name: default_instance_name(),
            api_key: None,
            typing_delay_ms: default_typing_delay_ms(),
            timeout_secs: default_evolution_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for EvolutionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvolutionConfig")
            .field("base_url", &self.base_url)
            .field("instance_name", &self.instance_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("typing_delay_ms", &self.typing_delay_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_evolution_base_url() -> String {
    "http://evolution:8080".to_string()
}

fn default_instance_name() -> String {
    "main".to_string()
}

fn default_typing_delay_ms() -> u32 {
    2000
}

fn default_evolution_timeout_secs() -> u64 {
    30
}

/// Campaign dispatch configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignConfig {
    /// Fixed pause between two sends of the same campaign. Keeps the
    /// messaging account under the provider's rate limits.
    #[serde(default = "default_send_delay_secs")]
    pub send_delay_secs: u64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            send_delay_secs: default_send_delay_secs(),
        }
    }
}

fn default_send_delay_secs() -> u64 {
    5
}

/// Phone normalization configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PhoneConfig {
    /// Country code prepended to 10/11-digit national numbers.
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            default_country_code: default_country_code(),
        }
    }
}

fn default_country_code() -> String {
    "55".to_string()
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::MontandonConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
/// Missing provider credentials are not errors here: the server can still
/// manage contacts and templates without them.
pub fn validate_config(config: &MontandonConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if !config.server.api_prefix.starts_with('/') || config.server.api_prefix.ends_with('/') {
        fail(format!(
            "server.api_prefix `{}` must start with `/` and must not end with `/`",
            config.server.api_prefix
        ));
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        fail(format!(
            "server.log_level `{}` must be one of: {}",
            config.server.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.apify.actor_id.trim().is_empty() {
        fail("apify.actor_id must not be empty".to_string());
    }

    if config.apify.timeout_secs == 0 {
        fail("apify.timeout_secs must be greater than 0".to_string());
    }

    for (key, url) in [
        ("apify.base_url", &config.apify.base_url),
        ("evolution.base_url", &config.evolution.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            fail(format!("{key} `{url}` must be an http(s) URL"));
        }
    }

    if config.evolution.instance_name.trim().is_empty() {
        fail("evolution.instance_name must not be empty".to_string());
    }

    if config.evolution.timeout_secs == 0 {
        fail("evolution.timeout_secs must be greater than 0".to_string());
    }

    let code = &config.phone.default_country_code;
    if code.is_empty() || code.len() > 3 || !code.chars().all(|c| c.is_ascii_digit()) {
        fail(format!(
            "phone.default_country_code `{code}` must be 1 to 3 digits"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./montandon.toml` > `~/.config/montandon/montandon.toml`
//! > `/etc/montandon/montandon.toml` with environment variable overrides via
//! the `MONTANDON_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MontandonConfig;

/// Top-level sections, used to turn `MONTANDON_<SECTION>_<KEY>` into
/// `<section>.<key>`.
const SECTIONS: &[&str] = &["server", "storage", "apify", "evolution", "campaign", "phone"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/montandon/montandon.toml` (system-wide)
/// 3. `~/.config/montandon/montandon.toml` (user XDG config)
/// 4. `./montandon.toml` (local directory)
/// 5. `MONTANDON_*` environment variables
pub fn load_config() -> Result<MontandonConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MontandonConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MontandonConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MontandonConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MontandonConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MontandonConfig::default()))
        .merge(Toml::file("/etc/montandon/montandon.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("montandon/montandon.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("montandon.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `MONTANDON_APIFY_API_KEY` must become `apify.api_key`, not
/// `apify.api.key`. Only the first underscore after a known section name is
/// turned into a dot.
fn env_provider() -> Env {
    Env::prefixed("MONTANDON_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_section_paths() {
        assert_eq!(map_env_key("apify_api_key"), "apify.api_key");
        assert_eq!(map_env_key("evolution_instance_name"), "evolution.instance_name");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("campaign_send_delay_secs"), "campaign.send_delay_secs");
        assert_eq!(map_env_key("server_port"), "server.port");
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(map_env_key("unrelated_key"), "unrelated_key");
    }

    #[test]
    fn env_keys_are_case_insensitive() {
        assert_eq!(map_env_key("APIFY_API_KEY"), "apify.api_key");
    }
}

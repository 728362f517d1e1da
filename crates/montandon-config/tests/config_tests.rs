// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use figment::Jail;
use montandon_config::diagnostic::ConfigError;
use montandon_config::{load_and_validate_str, load_config, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
api_prefix = "/api/v2"
log_level = "debug"

[storage]
database_path = "/tmp/montandon-test.db"
wal_mode = false

[apify]
api_key = "apify_api_123"
actor_id = "compass/crawler-google-places"
timeout_secs = 60

[evolution]
base_url = "https://evolution.example.com"
instance_name = "sales"
api_key = "evo-key"
typing_delay_ms = 1500

[campaign]
send_delay_secs = 8

[phone]
default_country_code = "351"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.api_prefix, "/api/v2");
    assert_eq!(config.storage.database_path, "/tmp/montandon-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.apify.api_key.as_deref(), Some("apify_api_123"));
    assert_eq!(config.apify.timeout_secs, 60);
    assert_eq!(config.evolution.instance_name, "sales");
    assert_eq!(config.evolution.typing_delay_ms, 1500);
    assert_eq!(config.campaign.send_delay_secs, 8);
    assert_eq!(config.phone.default_country_code, "351");
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.server.api_prefix, "/api/v1");
    assert_eq!(config.storage.database_path, "montandon.db");
    assert!(config.apify.api_key.is_none());
    assert_eq!(config.apify.actor_id, "compass/crawler-google-places");
    assert_eq!(config.apify.timeout_secs, 120);
    assert_eq!(config.evolution.base_url, "http://evolution:8080");
    assert_eq!(config.evolution.instance_name, "main");
    assert_eq!(config.evolution.typing_delay_ms, 2000);
    assert_eq!(config.campaign.send_delay_secs, 5);
    assert_eq!(config.phone.default_country_code, "55");
}

#[test]
fn unknown_field_is_reported_with_suggestion() {
    let toml = r#"
[apify]
actr_id = "someone/actor"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "actr_id");
            assert_eq!(suggestion.as_deref(), Some("actor_id"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[server]
port = "eighty"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string port");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

#[test]
fn semantic_validation_runs_after_parsing() {
    let toml = r#"
[phone]
default_country_code = "abc"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn env_vars_override_files() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "montandon.toml",
            r#"
[evolution]
instance_name = "from-file"
"#,
        )?;
        jail.set_env("MONTANDON_APIFY_API_KEY", "from-env");
        jail.set_env("MONTANDON_EVOLUTION_INSTANCE_NAME", "env-instance");
        jail.set_env("MONTANDON_CAMPAIGN_SEND_DELAY_SECS", "9");

        let config = load_config()?;
        assert_eq!(config.apify.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.evolution.instance_name, "env-instance");
        assert_eq!(config.campaign.send_delay_secs, 9);
        Ok(())
    });
}

#[test]
fn local_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "montandon.toml",
            r#"
[storage]
database_path = "local.db"
"#,
        )?;

        let config = load_config()?;
        assert_eq!(config.storage.database_path, "local.db");
        Ok(())
    });
}

#[test]
fn debug_output_redacts_credentials() {
    let toml = r#"
[apify]
api_key = "apify_secret_value"

[evolution]
api_key = "evolution_secret_value"
"#;
    let config = load_config_from_str(toml).unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains("apify_secret_value"));
    assert!(!debug.contains("evolution_secret_value"));
    assert!(debug.contains("[redacted]"));
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Montandon.
//!
//! This crate provides the error type, the domain records (contacts,
//! templates, campaigns, campaign logs), the phone normalizer, and the
//! adapter traits implemented by the storage, search and messaging crates.

pub mod error;
pub mod phone;
pub mod traits;
pub mod types;

pub use error::MontandonError;
pub use phone::{PhoneNormalizer, normalize_phone};
pub use types::{AdapterType, HealthStatus};

pub use traits::{MessageGateway, PluginAdapter, SearchGateway, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn montandon_error_has_all_variants() {
        let _config = MontandonError::Config("test".into());
        let _storage = MontandonError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _gateway = MontandonError::Gateway {
            message: "test".into(),
            source: None,
        };
        let _not_found = MontandonError::not_found("contact", 1);
        let _conflict = MontandonError::Conflict("test".into());
        let _validation = MontandonError::Validation("test".into());
        let _internal = MontandonError::Internal("test".into());
    }

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = MontandonError::not_found("template", 42);
        assert_eq!(err.to_string(), "template not found: 42");
        assert!(err.is_client_error());
    }

    #[test]
    fn upstream_errors_are_not_client_errors() {
        let err = MontandonError::Gateway {
            message: "apify returned 502".into(),
            source: None,
        };
        assert!(!err.is_client_error());
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Storage, AdapterType::Search, AdapterType::Messaging] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_labels() {
        assert_eq!(HealthStatus::Healthy.label(), "healthy");
        assert_eq!(HealthStatus::Degraded("slow".into()).label(), "degraded");
        assert_eq!(HealthStatus::Unhealthy("down".into()).label(), "unhealthy");
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_storage<T: StorageAdapter>() {}
        fn _assert_search<T: SearchGateway>() {}
        fn _assert_messaging<T: MessageGateway>() {}
        fn _assert_plugin<T: PluginAdapter>() {}
    }
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for integration testing.
//!
//! `TestHarness` assembles a temp SQLite database and the mock gateways,
//! with helpers to seed contacts and templates.

use std::sync::Arc;

use montandon_config::MontandonConfig;
use montandon_config::model::StorageConfig;
use montandon_core::types::{Contact, NewContact, NewTemplate, Template};
use montandon_core::{MontandonError, StorageAdapter};
use montandon_storage::SqliteStorage;

use crate::mock_messaging::MockMessageGateway;
use crate::mock_search::MockSearchGateway;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    search_results: Vec<NewContact>,
    send_delay_secs: u64,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            search_results: Vec::new(),
            send_delay_secs: 0,
        }
    }

    /// Set the candidates the mock search gateway returns.
    pub fn with_search_results(mut self, results: Vec<NewContact>) -> Self {
        self.search_results = results;
        self
    }

    /// Set the campaign send delay. Defaults to zero in tests.
    pub fn with_send_delay_secs(mut self, secs: u64) -> Self {
        self.send_delay_secs = secs;
        self
    }

    /// Build the test harness, opening a fresh database.
    pub async fn build(self) -> Result<TestHarness, MontandonError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| MontandonError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        let storage = SqliteStorage::new(storage_config.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let mut config = MontandonConfig {
            storage: storage_config,
            ..MontandonConfig::default()
        };
        config.campaign.send_delay_secs = self.send_delay_secs;
        config.evolution.typing_delay_ms = 0;

        Ok(TestHarness {
            storage,
            messaging: Arc::new(MockMessageGateway::new()),
            search: Arc::new(MockSearchGateway::with_results(self.search_results)),
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment backed by a temporary database.
///
/// The database lives as long as the harness.
pub struct TestHarness {
    pub storage: Arc<dyn StorageAdapter>,
    pub messaging: Arc<MockMessageGateway>,
    pub search: Arc<MockSearchGateway>,
    pub config: MontandonConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Start building a harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Insert contacts given as `(name, phone)` pairs.
    pub async fn add_contacts(
        &self,
        contacts: &[(&str, &str)],
    ) -> Result<Vec<Contact>, MontandonError> {
        let batch: Vec<NewContact> = contacts
            .iter()
            .map(|(name, phone)| NewContact {
                name: name.to_string(),
                phone: phone.to_string(),
                address: None,
                category: None,
                google_maps_link: None,
            })
            .collect();
        self.storage.insert_contacts(&batch).await
    }

    /// Create a template.
    pub async fn add_template(
        &self,
        name: &str,
        content: &str,
    ) -> Result<Template, MontandonError> {
        self.storage
            .create_template(&NewTemplate {
                name: name.to_string(),
                content: content.to_string(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_with_empty_database() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert!(harness.storage.list_contacts(0, 10).await.unwrap().is_empty());
        assert_eq!(harness.config.campaign.send_delay_secs, 0);
    }

    #[tokio::test]
    async fn seeding_helpers_persist_rows() {
        let harness = TestHarness::builder().build().await.unwrap();
        let contacts = harness
            .add_contacts(&[("Ana", "5511911110000"), ("Bia", "5511922220000")])
            .await
            .unwrap();
        let template = harness.add_template("hello", "Oi {name}").await.unwrap();

        assert_eq!(contacts.len(), 2);
        assert_eq!(
            harness.storage.get_template(template.id).await.unwrap(),
            Some(template)
        );
    }
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use montandon_config::model::StorageConfig;
use montandon_core::types::{
    Campaign, CampaignLog, CampaignLogView, CampaignStatus, Contact, ContactStatus,
    ContactUpdate, NewCampaign, NewCampaignLog, NewContact, NewTemplate, Template,
};
use montandon_core::{AdapterType, HealthStatus, MontandonError, PluginAdapter, StorageAdapter};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, MontandonError> {
        self.db.get().ok_or_else(|| MontandonError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MontandonError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), MontandonError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with_options(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| MontandonError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), MontandonError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Contacts ---

    async fn list_contacts(&self, skip: u32, limit: u32) -> Result<Vec<Contact>, MontandonError> {
        queries::contacts::list_contacts(self.db()?, skip, limit).await
    }

    async fn get_contact(&self, id: i64) -> Result<Option<Contact>, MontandonError> {
        queries::contacts::get_contact(self.db()?, id).await
    }

    async fn insert_contacts(
        &self,
        contacts: &[NewContact],
    ) -> Result<Vec<Contact>, MontandonError> {
        queries::contacts::insert_contacts(self.db()?, contacts).await
    }

    async fn update_contact(
        &self,
        id: i64,
        update: &ContactUpdate,
    ) -> Result<Option<Contact>, MontandonError> {
        queries::contacts::update_contact(self.db()?, id, update).await
    }

    async fn set_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> Result<(), MontandonError> {
        queries::contacts::set_contact_status(self.db()?, id, status).await
    }

    async fn delete_contact(&self, id: i64) -> Result<bool, MontandonError> {
        queries::contacts::delete_contact(self.db()?, id).await
    }

    // --- Templates ---

    async fn list_templates(&self) -> Result<Vec<Template>, MontandonError> {
        queries::templates::list_templates(self.db()?).await
    }

    async fn get_template(&self, id: i64) -> Result<Option<Template>, MontandonError> {
        queries::templates::get_template(self.db()?, id).await
    }

    async fn create_template(&self, template: &NewTemplate) -> Result<Template, MontandonError> {
        queries::templates::create_template(self.db()?, template).await
    }

    async fn delete_template(&self, id: i64) -> Result<bool, MontandonError> {
        queries::templates::delete_template(self.db()?, id).await
    }

    // --- Campaigns ---

    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<Campaign, MontandonError> {
        queries::campaigns::create_campaign(self.db()?, campaign).await
    }

    async fn get_campaign(&self, id: i64) -> Result<Option<Campaign>, MontandonError> {
        queries::campaigns::get_campaign(self.db()?, id).await
    }

    async fn list_campaigns(&self) -> Result<Vec<Campaign>, MontandonError> {
        queries::campaigns::list_campaigns(self.db()?).await
    }

    async fn campaign_targets(&self, campaign_id: i64) -> Result<Vec<Contact>, MontandonError> {
        queries::campaigns::campaign_targets(self.db()?, campaign_id).await
    }

    async fn transition_campaign(
        &self,
        id: i64,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> Result<bool, MontandonError> {
        queries::campaigns::transition_campaign(self.db()?, id, from, to).await
    }

    async fn fail_running_campaigns(&self) -> Result<usize, MontandonError> {
        queries::campaigns::fail_running_campaigns(self.db()?).await
    }

    // --- Campaign logs ---

    async fn insert_campaign_log(
        &self,
        log: &NewCampaignLog,
    ) -> Result<CampaignLog, MontandonError> {
        queries::logs::insert_campaign_log(self.db()?, log).await
    }

    async fn list_campaign_logs(&self) -> Result<Vec<CampaignLogView>, MontandonError> {
        queries::logs::list_campaign_logs(self.db()?).await
    }

    async fn campaign_logs(&self, campaign_id: i64) -> Result<Vec<CampaignLog>, MontandonError> {
        queries::logs::campaign_logs(self.db()?, campaign_id).await
    }
}

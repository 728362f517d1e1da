// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::MontandonError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Campaign, CampaignLog, CampaignLogView, CampaignStatus, Contact, ContactStatus,
    ContactUpdate, NewCampaign, NewCampaignLog, NewContact, NewTemplate, Template,
};

/// Adapter for the record store holding contacts, templates, campaigns and
/// campaign logs.
///
/// Every write is persisted before the call returns, so concurrent readers
/// observe intermediate campaign state.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), MontandonError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), MontandonError>;

    // --- Contacts ---

    /// Lists contacts ordered by id, paginated.
    async fn list_contacts(&self, skip: u32, limit: u32) -> Result<Vec<Contact>, MontandonError>;

    async fn get_contact(&self, id: i64) -> Result<Option<Contact>, MontandonError>;

    /// Inserts contacts in one transaction, skipping any whose phone already
    /// exists (in the store or earlier in the batch). Returns the created
    /// subset in submission order.
    async fn insert_contacts(
        &self,
        contacts: &[NewContact],
    ) -> Result<Vec<Contact>, MontandonError>;

    /// Applies a partial update. Returns `None` if the contact does not exist.
    async fn update_contact(
        &self,
        id: i64,
        update: &ContactUpdate,
    ) -> Result<Option<Contact>, MontandonError>;

    /// Sets a contact's status. Fails with `NotFound` if the contact vanished.
    async fn set_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> Result<(), MontandonError>;

    /// Deletes a contact. Returns false if it did not exist.
    async fn delete_contact(&self, id: i64) -> Result<bool, MontandonError>;

    // --- Templates ---

    async fn list_templates(&self) -> Result<Vec<Template>, MontandonError>;

    async fn get_template(&self, id: i64) -> Result<Option<Template>, MontandonError>;

    async fn create_template(&self, template: &NewTemplate) -> Result<Template, MontandonError>;

    /// Deletes a template. Returns false if it did not exist.
    async fn delete_template(&self, id: i64) -> Result<bool, MontandonError>;

    // --- Campaigns ---

    /// Creates a campaign in `QUEUED` state together with its ordered target
    /// list. Unknown contact ids are dropped; repeated ids keep their first
    /// position.
    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<Campaign, MontandonError>;

    async fn get_campaign(&self, id: i64) -> Result<Option<Campaign>, MontandonError>;

    async fn list_campaigns(&self) -> Result<Vec<Campaign>, MontandonError>;

    /// Returns the campaign's target contacts in submission order.
    async fn campaign_targets(&self, campaign_id: i64) -> Result<Vec<Contact>, MontandonError>;

    /// Moves a campaign from `from` to `to` only if it is currently in `from`.
    /// Returns whether the transition happened.
    async fn transition_campaign(
        &self,
        id: i64,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> Result<bool, MontandonError>;

    /// Marks every `RUNNING` campaign as `ERROR`. Returns how many changed.
    async fn fail_running_campaigns(&self) -> Result<usize, MontandonError>;

    // --- Campaign logs ---

    /// Appends one send attempt.
    async fn insert_campaign_log(
        &self,
        log: &NewCampaignLog,
    ) -> Result<CampaignLog, MontandonError>;

    /// All logs joined with campaign and contact names, newest first.
    async fn list_campaign_logs(&self) -> Result<Vec<CampaignLogView>, MontandonError>;

    /// Logs of one campaign in insertion order.
    async fn campaign_logs(&self, campaign_id: i64) -> Result<Vec<CampaignLog>, MontandonError>;
}

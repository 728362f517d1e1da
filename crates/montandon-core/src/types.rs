// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the HTTP layer.
//!
//! Timestamps are ISO 8601 strings produced by SQLite's `strftime`, matching
//! what the storage layer persists.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Short label used in health payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded(_) => "degraded",
            Self::Unhealthy(_) => "unhealthy",
        }
    }
}

/// Identifies the kind of external collaborator an adapter wraps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Search,
    Messaging,
}

/// Lifecycle status of a contact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactStatus {
    /// Imported, never messaged.
    #[default]
    Pending,
    /// Last send attempt succeeded.
    Sent,
    /// Last send attempt failed.
    Error,
    /// Set aside by the operator.
    Archived,
}

/// Lifecycle status of a campaign.
///
/// Progresses monotonically: `Queued -> Running -> Completed | Error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Draft,
    Queued,
    Running,
    Completed,
    Error,
}

impl CampaignStatus {
    /// Returns true once the campaign can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Outcome of one send attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogStatus {
    Sent,
    Error,
}

impl From<LogStatus> for ContactStatus {
    fn from(status: LogStatus) -> Self {
        match status {
            LogStatus::Sent => ContactStatus::Sent,
            LogStatus::Error => ContactStatus::Error,
        }
    }
}

/// A business contact, unique by phone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub category: Option<String>,
    pub google_maps_link: Option<String>,
    pub status: ContactStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// A contact candidate, either returned by a search or submitted for import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub google_maps_link: Option<String>,
}

/// Partial update of a contact. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<ContactStatus>,
}

/// A reusable message body with named placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub created_at: String,
}

/// Input for creating a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub content: String,
}

/// A bulk-send job tied to one template and an ordered set of contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub template_id: i64,
    pub status: CampaignStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Input for creating a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCampaign {
    pub name: String,
    pub template_id: i64,
    #[serde(default)]
    pub contact_ids: Vec<i64>,
}

/// One persisted send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignLog {
    pub id: i64,
    pub campaign_id: i64,
    pub contact_id: i64,
    pub status: LogStatus,
    pub error_message: Option<String>,
    pub sent_at: String,
}

/// Input for appending a send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaignLog {
    pub campaign_id: i64,
    pub contact_id: i64,
    pub status: LogStatus,
    pub error_message: Option<String>,
}

/// Flattened log row joined with campaign and contact names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignLogView {
    pub id: i64,
    pub status: LogStatus,
    pub sent_at: String,
    pub error_message: Option<String>,
    pub campaign_name: String,
    pub contact_name: String,
}

/// A maps search request: the cartesian product of terms and locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub terms: Vec<String>,
    pub locations: Vec<String>,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

fn default_search_limit() -> u32 {
    50
}

impl SearchQuery {
    /// Expands terms and locations into `"{term} in {location}"` strings,
    /// term-major.
    pub fn query_strings(&self) -> Vec<String> {
        self.terms
            .iter()
            .flat_map(|term| {
                self.locations
                    .iter()
                    .map(move |location| format!("{term} in {location}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn statuses_use_screaming_case_on_the_wire() {
        assert_eq!(ContactStatus::Pending.to_string(), "PENDING");
        assert_eq!(CampaignStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(LogStatus::Error.to_string(), "ERROR");
        assert_eq!(
            serde_json::to_string(&CampaignStatus::Running).unwrap(),
            "\"RUNNING\""
        );
        assert_eq!(
            ContactStatus::from_str("ARCHIVED").unwrap(),
            ContactStatus::Archived
        );
    }

    #[test]
    fn log_status_maps_to_contact_status() {
        assert_eq!(ContactStatus::from(LogStatus::Sent), ContactStatus::Sent);
        assert_eq!(ContactStatus::from(LogStatus::Error), ContactStatus::Error);
    }

    #[test]
    fn terminal_campaign_statuses() {
        assert!(CampaignStatus::Completed.is_terminal());
        assert!(CampaignStatus::Error.is_terminal());
        assert!(!CampaignStatus::Queued.is_terminal());
        assert!(!CampaignStatus::Running.is_terminal());
    }

    #[test]
    fn search_query_builds_cartesian_product() {
        let query = SearchQuery {
            terms: vec!["bakery".into(), "gym".into()],
            locations: vec!["Campinas".into(), "Santos".into()],
            limit: 10,
        };
        assert_eq!(
            query.query_strings(),
            vec![
                "bakery in Campinas",
                "bakery in Santos",
                "gym in Campinas",
                "gym in Santos",
            ]
        );
    }

    #[test]
    fn search_query_limit_defaults_to_fifty() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"terms":["a"],"locations":["b"]}"#).unwrap();
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn new_contact_optional_fields_default_to_none() {
        let contact: NewContact =
            serde_json::from_str(r#"{"name":"Padaria","phone":"5511999999999"}"#).unwrap();
        assert!(contact.address.is_none());
        assert!(contact.category.is_none());
        assert!(contact.google_maps_link.is_none());
    }
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the REST API.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use montandon_core::types::{
    Campaign, CampaignLogView, Contact, ContactUpdate, HealthStatus, NewCampaign, NewContact,
    NewTemplate, SearchQuery, Template,
};
use montandon_core::{
    MessageGateway, MontandonError, PluginAdapter, SearchGateway, StorageAdapter,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::server::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Query string for GET /contacts.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

/// Response body for the prefixed health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when every adapter is healthy, "degraded" otherwise.
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Adapter name to health label.
    pub adapters: BTreeMap<String, String>,
}

/// POST /search
///
/// Runs a maps search. Results are returned for review, not stored.
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchQuery>, JsonRejection>,
) -> ApiResult<Json<Vec<NewContact>>> {
    let Json(query) = payload?;
    let candidates = state.search.search(&query).await?;
    Ok(Json(candidates))
}

/// GET /contacts?skip&limit
pub async fn list_contacts(
    State(state): State<AppState>,
    page: Result<Query<Pagination>, QueryRejection>,
) -> ApiResult<Json<Vec<Contact>>> {
    let Query(page) = page?;
    Ok(Json(state.storage.list_contacts(page.skip, page.limit).await?))
}

/// POST /contacts
///
/// Bulk import. Phones are normalized first; contacts whose phone already
/// exists are skipped and only the created ones are returned.
pub async fn create_contacts(
    State(state): State<AppState>,
    payload: Result<Json<Vec<NewContact>>, JsonRejection>,
) -> ApiResult<Json<Vec<Contact>>> {
    let Json(contacts) = payload?;
    let mut batch = Vec::with_capacity(contacts.len());
    for (index, mut contact) in contacts.into_iter().enumerate() {
        contact.phone = state.normalizer.normalize(&contact.phone);
        if contact.phone.is_empty() {
            return Err(MontandonError::Validation(format!(
                "contact {index} (`{}`) has no phone digits",
                contact.name
            ))
            .into());
        }
        batch.push(contact);
    }

    let created = state.storage.insert_contacts(&batch).await?;
    info!(
        submitted = batch.len(),
        created = created.len(),
        "contacts imported"
    );
    Ok(Json(created))
}

/// PATCH /contacts/{id}
pub async fn update_contact(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ContactUpdate>, JsonRejection>,
) -> ApiResult<Json<Contact>> {
    let Path(id) = id?;
    let Json(mut update) = payload?;
    if let Some(phone) = update.phone.take() {
        let normalized = state.normalizer.normalize(&phone);
        if normalized.is_empty() {
            return Err(MontandonError::Validation(format!("`{phone}` has no phone digits")).into());
        }
        update.phone = Some(normalized);
    }
    let updated = state
        .storage
        .update_contact(id, &update)
        .await?
        .ok_or_else(|| MontandonError::not_found("contact", id))?;
    Ok(Json(updated))
}

/// DELETE /contacts/{id}
pub async fn delete_contact(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    if !state.storage.delete_contact(id).await? {
        return Err(MontandonError::not_found("contact", id).into());
    }
    Ok(Json(json!({ "ok": true })))
}

/// GET /templates
pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Vec<Template>>> {
    Ok(Json(state.storage.list_templates().await?))
}

/// POST /templates
///
/// Rejects content with malformed or unknown placeholders.
pub async fn create_template(
    State(state): State<AppState>,
    payload: Result<Json<NewTemplate>, JsonRejection>,
) -> ApiResult<Json<Template>> {
    let Json(template) = payload?;
    if template.name.trim().is_empty() {
        return Err(MontandonError::Validation("template name must not be empty".into()).into());
    }
    montandon_campaign::validate_template(&template.content)
        .map_err(|e| MontandonError::Validation(e.to_string()))?;
    let created = state.storage.create_template(&template).await?;
    Ok(Json(created))
}

/// DELETE /templates/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = id?;
    if !state.storage.delete_template(id).await? {
        return Err(MontandonError::not_found("template", id).into());
    }
    Ok(Json(json!({ "ok": true })))
}

/// POST /campaigns
///
/// Stores the campaign as QUEUED with its targets and starts the dispatcher
/// in the background. Returns without waiting for any send.
pub async fn create_campaign(
    State(state): State<AppState>,
    payload: Result<Json<NewCampaign>, JsonRejection>,
) -> ApiResult<Json<Campaign>> {
    let Json(campaign) = payload?;
    let created = state.storage.create_campaign(&campaign).await?;
    info!(
        campaign_id = created.id,
        targets = campaign.contact_ids.len(),
        "campaign queued"
    );
    if let Err(e) = state.dispatcher.spawn(created.id) {
        warn!(campaign_id = created.id, error = %e, "campaign dispatch not started");
    }
    Ok(Json(created))
}

/// GET /campaigns
pub async fn list_campaigns(State(state): State<AppState>) -> ApiResult<Json<Vec<Campaign>>> {
    Ok(Json(state.storage.list_campaigns().await?))
}

/// GET /campaigns/{id}
pub async fn get_campaign(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Campaign>> {
    let Path(id) = id?;
    let campaign = state
        .storage
        .get_campaign(id)
        .await?
        .ok_or_else(|| MontandonError::not_found("campaign", id))?;
    Ok(Json(campaign))
}

/// GET /campaigns/logs
///
/// Every send attempt with campaign and contact names, newest first.
pub async fn list_campaign_logs(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CampaignLogView>>> {
    Ok(Json(state.storage.list_campaign_logs().await?))
}

/// GET /messaging/status
///
/// Connection state of the messaging instance, passed through as-is.
pub async fn messaging_status(State(state): State<AppState>) -> Json<Value> {
    Json(state.messaging.instance_status().await)
}

/// GET /health (unprefixed)
pub async fn liveness() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET {prefix}/health
///
/// Version, uptime and the health of each adapter.
pub async fn detailed_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let checks = [
        (state.storage.name(), state.storage.health_check().await),
        (state.search.name(), state.search.health_check().await),
        (state.messaging.name(), state.messaging.health_check().await),
    ];

    let mut adapters = BTreeMap::new();
    let mut all_healthy = true;
    for (name, result) in checks {
        let health = result.unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));
        all_healthy &= health == HealthStatus::Healthy;
        adapters.insert(name.to_string(), health.label().to_string());
    }

    Json(HealthResponse {
        status: if all_healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        adapters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
            adapters: BTreeMap::from([("sqlite".to_string(), "healthy".to_string())]),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["uptime_secs"], 42);
        assert_eq!(json["adapters"]["sqlite"], "healthy");
    }
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Apify Google Maps search adapter for Montandon.
//!
//! This crate implements [`SearchGateway`] on top of the
//! `compass/crawler-google-places` actor: search terms are crossed with
//! locations, crawled in one synchronous run, and the resulting places are
//! mapped to contact candidates with normalized phones.

pub mod client;
pub mod types;

use async_trait::async_trait;
use montandon_config::MontandonConfig;
use montandon_core::types::{AdapterType, HealthStatus, NewContact, SearchQuery};
use montandon_core::{MontandonError, PhoneNormalizer, PluginAdapter, SearchGateway};
use tracing::{debug, info};

use crate::client::ApifyClient;
use crate::types::{PlaceItem, RunInput};

/// Name given to listings without a title.
const UNKNOWN_NAME: &str = "Unknown";

/// Maps search backed by an Apify actor.
pub struct ApifySearch {
    client: ApifyClient,
    normalizer: PhoneNormalizer,
    language: String,
    country_code: String,
    zoom: u8,
}

impl ApifySearch {
    /// Creates the adapter from the `[apify]` and `[phone]` sections.
    pub fn new(config: &MontandonConfig) -> Result<Self, MontandonError> {
        let client = ApifyClient::new(&config.apify)?;
        info!(
            actor = %config.apify.actor_id,
            authenticated = client.has_token(),
            "Apify search initialized"
        );
        Ok(Self {
            client,
            normalizer: PhoneNormalizer::new(config.phone.default_country_code.clone()),
            language: config.apify.language.clone(),
            country_code: config.apify.country_code.clone(),
            zoom: config.apify.zoom,
        })
    }

    fn to_candidate(&self, item: PlaceItem) -> Option<NewContact> {
        let phone = self.normalizer.normalize(item.raw_phone()?);
        if phone.is_empty() {
            return None;
        }
        Some(NewContact {
            name: item.title.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            phone,
            address: item.address,
            category: item.category_name,
            google_maps_link: item.url,
        })
    }
}

#[async_trait]
impl PluginAdapter for ApifySearch {
    fn name(&self) -> &str {
        "apify"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, MontandonError> {
        // Actor runs are billed, so the check stops at configuration.
        if self.client.has_token() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("API key not configured".into()))
        }
    }
}

#[async_trait]
impl SearchGateway for ApifySearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<NewContact>, MontandonError> {
        let search_strings = query.query_strings();
        if search_strings.is_empty() {
            debug!("empty search query, skipping Apify run");
            return Ok(Vec::new());
        }

        info!(
            queries = search_strings.len(),
            limit = query.limit,
            "starting Apify search"
        );
        let input = RunInput {
            search_strings_array: search_strings,
            max_crawled_places: query.limit,
            language: self.language.clone(),
            country_code: self.country_code.clone(),
            zoom: self.zoom,
        };

        let items = self.client.run_sync(&input).await?;
        let total = items.len();
        let candidates: Vec<NewContact> = items
            .into_iter()
            .filter_map(|item| self.to_candidate(item))
            .collect();
        info!(
            items = total,
            candidates = candidates.len(),
            "Apify search finished"
        );
        Ok(candidates)
    }
}

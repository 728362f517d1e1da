// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and response types for the Google Maps crawler actor.

use serde::{Deserialize, Serialize};

/// Input document for a synchronous actor run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInput {
    /// One `"{term} in {location}"` string per crawl.
    pub search_strings_array: Vec<String>,
    /// Upper bound on places crawled per search string.
    pub max_crawled_places: u32,
    pub language: String,
    pub country_code: String,
    pub zoom: u8,
}

/// One place listing from the run's dataset.
///
/// The crawler emits many more fields; only the ones mapped to contacts are
/// kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub phone_unformatted: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PlaceItem {
    /// The raw phone, preferring the unformatted variant. Empty strings count
    /// as absent.
    pub fn raw_phone(&self) -> Option<&str> {
        [&self.phone_unformatted, &self.phone]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .find(|p| !p.trim().is_empty())
    }
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps search provider trait.

use async_trait::async_trait;

use crate::error::MontandonError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{NewContact, SearchQuery};

/// Adapter for a maps data provider that turns search terms into contact
/// candidates.
#[async_trait]
pub trait SearchGateway: PluginAdapter {
    /// Runs one batch search and returns candidates with normalized phones.
    ///
    /// Listings without a phone number are dropped. Any transport or
    /// provider failure is returned as a single [`MontandonError::Gateway`];
    /// partial results are never returned.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<NewContact>, MontandonError>;
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock maps search gateway.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use montandon_core::MontandonError;
use montandon_core::traits::{PluginAdapter, SearchGateway};
use montandon_core::types::{AdapterType, HealthStatus, NewContact, SearchQuery};

/// A mock search gateway returning pre-configured candidates.
///
/// Every query is captured. While [`set_failing`](Self::set_failing) is on the
/// search returns a gateway error instead.
#[derive(Clone, Default)]
pub struct MockSearchGateway {
    results: Arc<Mutex<Vec<NewContact>>>,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
    failing: Arc<AtomicBool>,
}

impl MockSearchGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway that returns `results` for every query.
    pub fn with_results(results: Vec<NewContact>) -> Self {
        Self {
            results: Arc::new(Mutex::new(results)),
            ..Self::default()
        }
    }

    /// Toggle provider failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Queries received so far.
    pub async fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockSearchGateway {
    fn name(&self) -> &str {
        "mock-search"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Search
    }

    async fn health_check(&self) -> Result<HealthStatus, MontandonError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SearchGateway for MockSearchGateway {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<NewContact>, MontandonError> {
        self.queries.lock().await.push(query.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(MontandonError::Gateway {
                message: "mock search failure".into(),
                source: None,
            });
        }
        Ok(self.results.lock().await.clone())
    }
}

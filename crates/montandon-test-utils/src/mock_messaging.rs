// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging gateway for deterministic testing.
//!
//! `MockMessageGateway` implements `MessageGateway`, captures every send
//! attempt, and reports failure for phones registered with
//! [`MockMessageGateway::fail_for`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use montandon_core::MontandonError;
use montandon_core::traits::{MessageGateway, PluginAdapter};
use montandon_core::types::{AdapterType, HealthStatus};

/// One captured call to `send_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub phone: String,
    pub body: String,
    pub typing_delay_ms: u32,
    /// What `send_text` returned for this attempt.
    pub accepted: bool,
}

/// A mock messaging gateway for testing.
#[derive(Clone, Default)]
pub struct MockMessageGateway {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MockMessageGateway {
    /// Create a gateway that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `phone` fail.
    pub async fn fail_for(&self, phone: &str) {
        self.failing.lock().await.insert(phone.to_string());
    }

    /// All send attempts, in call order.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Number of send attempts.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockMessageGateway {
    fn name(&self) -> &str {
        "mock-messaging"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Messaging
    }

    async fn health_check(&self) -> Result<HealthStatus, MontandonError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl MessageGateway for MockMessageGateway {
    async fn send_text(&self, phone: &str, body: &str, typing_delay_ms: u32) -> bool {
        let accepted = !self.failing.lock().await.contains(phone);
        self.sent.lock().await.push(SentMessage {
            phone: phone.to_string(),
            body: body.to_string(),
            typing_delay_ms,
            accepted,
        });
        accepted
    }

    async fn instance_status(&self) -> serde_json::Value {
        json!({ "instance": { "instanceName": "mock", "state": "open" } })
    }
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging gateway trait.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;

/// Adapter for the outbound messaging provider.
///
/// Neither method returns an error: failures are logged by the
/// implementation and folded into the return value.
#[async_trait]
pub trait MessageGateway: PluginAdapter {
    /// Sends one pre-rendered text message. Returns true only if the
    /// provider accepted it.
    ///
    /// `typing_delay_ms` is passed to the provider, which shows a "typing"
    /// presence for that long before delivering.
    async fn send_text(&self, phone: &str, body: &str, typing_delay_ms: u32) -> bool;

    /// Best-effort connection state of the messaging instance. On failure
    /// returns `{"error": "<message>"}`.
    async fn instance_status(&self) -> serde_json::Value;
}

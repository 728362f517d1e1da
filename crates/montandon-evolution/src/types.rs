// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evolution API request and response types.

use serde::{Deserialize, Serialize};

/// Body of `POST /message/sendText/{instance}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest {
    pub number: String,
    pub options: SendOptions,
    pub text_message: TextMessage,
}

impl SendTextRequest {
    /// A plain text message preceded by a "composing" presence of
    /// `delay_ms`.
    pub fn new(number: &str, text: &str, delay_ms: u32) -> Self {
        Self {
            number: number.to_string(),
            options: SendOptions {
                delay: delay_ms,
                presence: "composing".to_string(),
                link_preview: false,
            },
            text_message: TextMessage {
                text: text.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    pub delay: u32,
    pub presence: String,
    pub link_preview: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextMessage {
    pub text: String,
}

/// Response of `GET /instance/connectionState/{instance}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionStateResponse {
    pub instance: InstanceState,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceState {
    #[serde(default)]
    pub instance_name: Option<String>,
    pub state: String,
}

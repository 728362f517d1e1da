// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evolution API WhatsApp messaging adapter for Montandon.
//!
//! This crate implements [`MessageGateway`] against a self-hosted Evolution
//! API server. Sends are single attempts: transport errors and non-2xx
//! replies are logged and reported as `false`, never raised.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use montandon_config::model::EvolutionConfig;
use montandon_core::types::{AdapterType, HealthStatus};
use montandon_core::{MessageGateway, MontandonError, PluginAdapter};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use tracing::{debug, error, info};

use crate::types::{ConnectionStateResponse, SendTextRequest};

/// Messaging gateway backed by one Evolution API instance.
#[derive(Debug, Clone)]
pub struct EvolutionGateway {
    client: reqwest::Client,
    base_url: String,
    instance: String,
}

impl EvolutionGateway {
    /// Creates the gateway from the `[evolution]` section.
    ///
    /// The API key, when set, is sent as the `apikey` header on every call.
    pub fn new(config: &EvolutionConfig) -> Result<Self, MontandonError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                "apikey",
                HeaderValue::from_str(key).map_err(|e| {
                    MontandonError::Config(format!("invalid Evolution API key header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MontandonError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(
            base_url = %config.base_url,
            instance = %config.instance_name,
            "Evolution gateway initialized"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            instance: config.instance_name.clone(),
        })
    }

    async fn fetch_status(&self) -> Result<serde_json::Value, reqwest::Error> {
        let url = format!(
            "{}/instance/connectionState/{}",
            self.base_url, self.instance
        );
        self.client.get(url).send().await?.json().await
    }
}

#[async_trait]
impl PluginAdapter for EvolutionGateway {
    fn name(&self) -> &str {
        "evolution"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Messaging
    }

    async fn health_check(&self) -> Result<HealthStatus, MontandonError> {
        let value = match self.fetch_status().await {
            Ok(value) => value,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        match serde_json::from_value::<ConnectionStateResponse>(value) {
            Ok(state) if state.instance.state == "open" => Ok(HealthStatus::Healthy),
            Ok(state) => Ok(HealthStatus::Degraded(format!(
                "instance state is {}",
                state.instance.state
            ))),
            Err(e) => Ok(HealthStatus::Degraded(format!(
                "unexpected connection state payload: {e}"
            ))),
        }
    }
}

#[async_trait]
impl MessageGateway for EvolutionGateway {
    async fn send_text(&self, phone: &str, body: &str, typing_delay_ms: u32) -> bool {
        let url = format!("{}/message/sendText/{}", self.base_url, self.instance);
        let request = SendTextRequest::new(phone, body, typing_delay_ms);

        let response = match self.client.post(url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(phone, error = %e, "failed to send message");
                return false;
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(phone, status = %status, "message accepted");
            true
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(phone, status = %status, body = %body, "Evolution API rejected message");
            false
        }
    }

    async fn instance_status(&self) -> serde_json::Value {
        match self.fetch_status().await {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "failed to fetch instance status");
                json!({ "error": e.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_gateway(base_url: &str) -> EvolutionGateway {
        EvolutionGateway::new(&EvolutionConfig {
            base_url: base_url.to_string(),
            instance_name: "main".into(),
            api_key: Some("evo-test-key".into()),
            ..EvolutionConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn send_text_posts_payload_with_apikey() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/message/sendText/main"))
            .and(header("apikey", "evo-test-key"))
            .and(body_json(json!({
                "number": "5511999999999",
                "options": {"delay": 1500, "presence": "composing", "linkPreview": false},
                "textMessage": {"text": "Olá Padaria"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"key": {"id": "ABC"}})))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        assert!(gateway.send_text("5511999999999", "Olá Padaria", 1500).await);
    }

    #[tokio::test]
    async fn send_text_returns_false_on_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad number"})))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        assert!(!gateway.send_text("123", "hi", 0).await);
    }

    #[tokio::test]
    async fn send_text_returns_false_when_unreachable() {
        // Nothing listens on port 9 of localhost.
        let gateway = test_gateway("http://127.0.0.1:9");
        assert!(!gateway.send_text("5511999999999", "hi", 0).await);
    }

    #[tokio::test]
    async fn instance_status_passes_provider_json_through() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/instance/connectionState/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "instance": {"instanceName": "main", "state": "open"}
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        let status = gateway.instance_status().await;
        assert_eq!(status["instance"]["state"], "open");
        assert_eq!(gateway.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn instance_status_reports_error_object() {
        let gateway = test_gateway("http://127.0.0.1:9");
        let status = gateway.instance_status().await;
        assert!(status.get("error").and_then(|e| e.as_str()).is_some());
        assert!(matches!(
            gateway.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }

    #[tokio::test]
    async fn closed_instance_is_degraded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/instance/connectionState/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "instance": {"instanceName": "main", "state": "close"}
            })))
            .mount(&server)
            .await;

        let gateway = test_gateway(&server.uri());
        assert!(matches!(
            gateway.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }
}

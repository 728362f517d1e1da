// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Apify actor API.
//!
//! Provides [`ApifyClient`] which runs an actor synchronously and returns the
//! items of its default dataset in one round trip.

use std::time::Duration;

use montandon_config::model::ApifyConfig;
use montandon_core::MontandonError;
use reqwest::Url;
use tracing::{debug, error};

use crate::types::{PlaceItem, RunInput};

/// HTTP client for synchronous actor runs.
///
/// There is no retry: a failed run is reported once and the caller decides
/// whether to resubmit.
#[derive(Debug, Clone)]
pub struct ApifyClient {
    client: reqwest::Client,
    run_url: Url,
    token: Option<String>,
    memory_mb: u32,
}

impl ApifyClient {
    /// Creates a client for the actor named in `config`.
    ///
    /// The token is optional so the service can start without search
    /// credentials; runs fail with a gateway error until one is configured.
    pub fn new(config: &ApifyConfig) -> Result<Self, MontandonError> {
        let run_url = run_url(&config.base_url, &config.actor_id)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MontandonError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            run_url,
            token: config.api_key.clone(),
            memory_mb: config.memory_mb,
        })
    }

    /// Returns true when an API token is configured.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Runs the actor with `input` and waits for its dataset items.
    pub async fn run_sync(&self, input: &RunInput) -> Result<Vec<PlaceItem>, MontandonError> {
        let token = self.token.as_deref().ok_or_else(|| MontandonError::Gateway {
            message: "Apify API key is not configured".into(),
            source: None,
        })?;

        let mut url = self.run_url.clone();
        url.query_pairs_mut()
            .append_pair("token", token)
            .append_pair("memory", &self.memory_mb.to_string());

        let response = self
            .client
            .post(url)
            .json(input)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Apify request failed");
                MontandonError::Gateway {
                    message: format!("Apify request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;

        let status = response.status();
        debug!(status = %status, "Apify run finished");

        let body = response.text().await.map_err(|e| MontandonError::Gateway {
            message: format!("failed to read Apify response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            error!(status = %status, body = %body, "Apify returned an error");
            return Err(MontandonError::Gateway {
                message: format!("Apify returned {status}"),
                source: None,
            });
        }

        serde_json::from_str::<Vec<PlaceItem>>(&body).map_err(|e| {
            error!(error = %e, "Apify response is not a list of places");
            MontandonError::Gateway {
                message: format!("failed to parse Apify response: {e}"),
                source: Some(Box::new(e)),
            }
        })
    }
}

/// Builds `{base}/acts/{owner~name}/run-sync-get-dataset-items`.
fn run_url(base_url: &str, actor_id: &str) -> Result<Url, MontandonError> {
    let raw = format!(
        "{}/acts/{}/run-sync-get-dataset-items",
        base_url.trim_end_matches('/'),
        actor_id.replace('/', "~")
    );
    Url::parse(&raw).map_err(|e| MontandonError::Config(format!("invalid Apify URL `{raw}`: {e}")))
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign dispatch: the per-campaign send loop.
//!
//! A [`CampaignDispatcher`] walks a campaign's target contacts in order,
//! renders the template for each one, hands the message to the messaging
//! gateway, and records the outcome as a campaign log plus a contact status.
//! Sends are strictly sequential with a fixed pause between them.
//!
//! Two guards keep a campaign from running twice: an in-process registry of
//! active campaign ids, and the conditional `QUEUED -> RUNNING` transition in
//! storage.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use montandon_config::MontandonConfig;
use montandon_core::types::{
    Campaign, CampaignStatus, Contact, LogStatus, NewCampaignLog, Template,
};
use montandon_core::{MessageGateway, MontandonError, StorageAdapter};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::template;

/// Diagnostic recorded when the messaging gateway refuses a message.
pub const SEND_FAILURE_MESSAGE: &str = "Failed to send via Evolution API";

/// Pacing for a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Pause between two consecutive sends.
    pub send_delay: Duration,
    /// "Typing" presence the provider shows before each message.
    pub typing_delay_ms: u32,
}

impl DispatchConfig {
    pub fn from_config(config: &MontandonConfig) -> Self {
        Self {
            send_delay: Duration::from_secs(config.campaign.send_delay_secs),
            typing_delay_ms: config.evolution.typing_delay_ms,
        }
    }
}

/// How a dispatch run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The campaign or its template no longer exists; nothing was written.
    Skipped,
    /// Every target was attempted and the campaign is `COMPLETED`.
    Completed { sent: usize, failed: usize },
    /// A storage failure stopped the run and the campaign is `ERROR`.
    Aborted { reason: String },
}

/// Removes the campaign id from the active set when the run ends, including
/// on panic.
struct ActiveRun {
    active: Arc<DashSet<i64>>,
    campaign_id: i64,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.active.remove(&self.campaign_id);
    }
}

/// Runs campaigns against a storage adapter and a messaging gateway.
///
/// Cloning is cheap and clones share the active-run registry, so one
/// dispatcher can be handed to every request handler.
#[derive(Clone)]
pub struct CampaignDispatcher {
    storage: Arc<dyn StorageAdapter>,
    messaging: Arc<dyn MessageGateway>,
    config: DispatchConfig,
    active: Arc<DashSet<i64>>,
}

impl CampaignDispatcher {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        messaging: Arc<dyn MessageGateway>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            storage,
            messaging,
            config,
            active: Arc::new(DashSet::new()),
        }
    }

    /// Returns true while a run for `campaign_id` is in progress in this
    /// process.
    pub fn is_active(&self, campaign_id: i64) -> bool {
        self.active.contains(&campaign_id)
    }

    fn claim(&self, campaign_id: i64) -> Result<ActiveRun, MontandonError> {
        if !self.active.insert(campaign_id) {
            return Err(MontandonError::Conflict(format!(
                "campaign {campaign_id} is already running"
            )));
        }
        Ok(ActiveRun {
            active: Arc::clone(&self.active),
            campaign_id,
        })
    }

    /// Starts a detached run for `campaign_id`.
    ///
    /// Fails immediately with `Conflict` if a run for the same campaign is
    /// already active in this process. The returned handle may be dropped;
    /// the run continues on its own.
    pub fn spawn(
        &self,
        campaign_id: i64,
    ) -> Result<JoinHandle<Result<DispatchOutcome, MontandonError>>, MontandonError> {
        let guard = self.claim(campaign_id)?;
        let dispatcher = self.clone();
        Ok(tokio::spawn(async move {
            let _guard = guard;
            let result = dispatcher.execute(campaign_id).await;
            match &result {
                Err(e @ MontandonError::Conflict(_)) => {
                    warn!(campaign_id, error = %e, "campaign run rejected");
                }
                Err(e) => error!(campaign_id, error = %e, "campaign run failed"),
                Ok(_) => {}
            }
            result
        }))
    }

    /// Runs `campaign_id` to completion on the current task.
    pub async fn run(&self, campaign_id: i64) -> Result<DispatchOutcome, MontandonError> {
        let _guard = self.claim(campaign_id)?;
        self.execute(campaign_id).await
    }

    async fn execute(&self, campaign_id: i64) -> Result<DispatchOutcome, MontandonError> {
        // 1. Load the campaign and its template
        let Some(campaign) = self.storage.get_campaign(campaign_id).await? else {
            warn!(campaign_id, "campaign vanished before dispatch");
            return Ok(DispatchOutcome::Skipped);
        };
        let Some(template) = self.storage.get_template(campaign.template_id).await? else {
            warn!(
                campaign_id,
                template_id = campaign.template_id,
                "template vanished before dispatch"
            );
            return Ok(DispatchOutcome::Skipped);
        };

        // 2. Claim the run in storage
        let claimed = self
            .storage
            .transition_campaign(campaign_id, CampaignStatus::Queued, CampaignStatus::Running)
            .await?;
        if !claimed {
            let reason = if campaign.status.is_terminal() {
                format!("campaign {campaign_id} already finished as {}", campaign.status)
            } else {
                format!("campaign {campaign_id} is {}, not QUEUED", campaign.status)
            };
            return Err(MontandonError::Conflict(reason));
        }
        info!(campaign_id, name = %campaign.name, "campaign started");

        // 3. Send to every target, then settle the final status
        match self.send_all(&campaign, &template).await {
            Ok((sent, failed)) => {
                self.finish(campaign_id, CampaignStatus::Completed).await?;
                info!(campaign_id, sent, failed, "campaign completed");
                Ok(DispatchOutcome::Completed { sent, failed })
            }
            Err(e) => {
                error!(campaign_id, error = %e, "campaign aborted");
                self.finish(campaign_id, CampaignStatus::Error).await?;
                Ok(DispatchOutcome::Aborted {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Attempts every target in order. Returns `(sent, failed)`.
    ///
    /// Render and send failures are recorded per contact; only storage
    /// errors escape.
    async fn send_all(
        &self,
        campaign: &Campaign,
        template: &Template,
    ) -> Result<(usize, usize), MontandonError> {
        let targets = self.storage.campaign_targets(campaign.id).await?;
        debug!(campaign_id = campaign.id, targets = targets.len(), "targets loaded");

        let mut sent = 0;
        let mut failed = 0;
        for (index, contact) in targets.iter().enumerate() {
            if index > 0 && !self.config.send_delay.is_zero() {
                tokio::time::sleep(self.config.send_delay).await;
            }
            match self.send_one(campaign.id, &template.content, contact).await? {
                LogStatus::Sent => sent += 1,
                LogStatus::Error => failed += 1,
            }
        }
        Ok((sent, failed))
    }

    async fn send_one(
        &self,
        campaign_id: i64,
        content: &str,
        contact: &Contact,
    ) -> Result<LogStatus, MontandonError> {
        let (status, error_message) = match template::render(content, contact) {
            Ok(body) => {
                let accepted = self
                    .messaging
                    .send_text(&contact.phone, &body, self.config.typing_delay_ms)
                    .await;
                if accepted {
                    (LogStatus::Sent, None)
                } else {
                    (LogStatus::Error, Some(SEND_FAILURE_MESSAGE.to_string()))
                }
            }
            Err(e) => {
                warn!(campaign_id, contact_id = contact.id, error = %e, "template render failed");
                (LogStatus::Error, Some(e.to_string()))
            }
        };

        self.storage
            .insert_campaign_log(&NewCampaignLog {
                campaign_id,
                contact_id: contact.id,
                status,
                error_message,
            })
            .await?;
        self.storage
            .set_contact_status(contact.id, status.into())
            .await?;
        debug!(campaign_id, contact_id = contact.id, status = %status, "contact processed");
        Ok(status)
    }

    async fn finish(&self, campaign_id: i64, to: CampaignStatus) -> Result<(), MontandonError> {
        let moved = self
            .storage
            .transition_campaign(campaign_id, CampaignStatus::Running, to)
            .await?;
        if !moved {
            warn!(campaign_id, status = %to, "campaign left RUNNING during the run");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montandon_core::types::{ContactStatus, NewCampaign, NewContact};
    use montandon_test_utils::TestHarness;

    fn dispatcher(harness: &TestHarness, send_delay: Duration) -> CampaignDispatcher {
        CampaignDispatcher::new(
            harness.storage.clone(),
            harness.messaging.clone(),
            DispatchConfig {
                send_delay,
                typing_delay_ms: 1200,
            },
        )
    }

    async fn queue_campaign(harness: &TestHarness, content: &str, contact_ids: Vec<i64>) -> i64 {
        let template = harness.add_template("t", content).await.unwrap();
        harness
            .storage
            .create_campaign(&NewCampaign {
                name: "test campaign".into(),
                template_id: template.id,
                contact_ids,
            })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn dispatch_config_reads_campaign_and_evolution_sections() {
        let mut config = MontandonConfig::default();
        config.campaign.send_delay_secs = 7;
        config.evolution.typing_delay_ms = 900;
        let dispatch = DispatchConfig::from_config(&config);
        assert_eq!(dispatch.send_delay, Duration::from_secs(7));
        assert_eq!(dispatch.typing_delay_ms, 900);
    }

    #[tokio::test]
    async fn sends_to_every_target_in_order() {
        let harness = TestHarness::builder().build().await.unwrap();
        let contacts = harness
            .add_contacts(&[("Ana", "5511911110000"), ("Bia", "5511922220000")])
            .await
            .unwrap();
        let campaign_id =
            queue_campaign(&harness, "Oi {nome}!", vec![contacts[1].id, contacts[0].id]).await;

        let outcome = dispatcher(&harness, Duration::ZERO)
            .run(campaign_id)
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed { sent: 2, failed: 0 });

        let sent = harness.messaging.sent_messages().await;
        let bodies: Vec<&str> = sent.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["Oi Bia!", "Oi Ana!"]);
        assert_eq!(sent[0].phone, "5511922220000");
        assert_eq!(sent[0].typing_delay_ms, 1200);

        let campaign = harness.storage.get_campaign(campaign_id).await.unwrap().unwrap();
        assert_eq!(campaign.status, CampaignStatus::Completed);
        for contact in &contacts {
            let stored = harness.storage.get_contact(contact.id).await.unwrap().unwrap();
            assert_eq!(stored.status, ContactStatus::Sent);
        }
        let logs = harness.storage.campaign_logs(campaign_id).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.status == LogStatus::Sent && l.error_message.is_none()));
    }

    #[tokio::test]
    async fn gateway_refusal_is_logged_and_run_continues() {
        let harness = TestHarness::builder().build().await.unwrap();
        let contacts = harness
            .add_contacts(&[("Ana", "5511911110000"), ("Bia", "5511922220000")])
            .await
            .unwrap();
        harness.messaging.fail_for("5511911110000").await;
        let campaign_id =
            queue_campaign(&harness, "Oi {name}", contacts.iter().map(|c| c.id).collect()).await;

        let outcome = dispatcher(&harness, Duration::ZERO)
            .run(campaign_id)
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed { sent: 1, failed: 1 });

        let logs = harness.storage.campaign_logs(campaign_id).await.unwrap();
        assert_eq!(logs[0].status, LogStatus::Error);
        assert_eq!(logs[0].error_message.as_deref(), Some(SEND_FAILURE_MESSAGE));
        assert_eq!(logs[1].status, LogStatus::Sent);

        let ana = harness.storage.get_contact(contacts[0].id).await.unwrap().unwrap();
        assert_eq!(ana.status, ContactStatus::Error);
    }

    #[tokio::test]
    async fn unknown_placeholder_fails_each_contact_without_sending() {
        let harness = TestHarness::builder().build().await.unwrap();
        let contacts = harness
            .add_contacts(&[("Ana", "5511911110000")])
            .await
            .unwrap();
        let campaign_id = queue_campaign(&harness, "Oi {apelido}", vec![contacts[0].id]).await;

        let outcome = dispatcher(&harness, Duration::ZERO)
            .run(campaign_id)
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed { sent: 0, failed: 1 });
        assert_eq!(harness.messaging.sent_count().await, 0);

        let logs = harness.storage.campaign_logs(campaign_id).await.unwrap();
        assert!(
            logs[0]
                .error_message
                .as_deref()
                .is_some_and(|m| m.contains("apelido"))
        );
    }

    #[tokio::test]
    async fn empty_target_list_completes_without_logs() {
        let harness = TestHarness::builder().build().await.unwrap();
        let campaign_id = queue_campaign(&harness, "Oi {name}", vec![]).await;

        let outcome = dispatcher(&harness, Duration::ZERO)
            .run(campaign_id)
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed { sent: 0, failed: 0 });
        assert!(harness.storage.campaign_logs(campaign_id).await.unwrap().is_empty());
        let campaign = harness.storage.get_campaign(campaign_id).await.unwrap().unwrap();
        assert_eq!(campaign.status, CampaignStatus::Completed);
    }

    #[tokio::test]
    async fn missing_campaign_is_skipped() {
        let harness = TestHarness::builder().build().await.unwrap();
        let outcome = dispatcher(&harness, Duration::ZERO).run(404).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Skipped);
    }

    #[tokio::test]
    async fn second_run_of_same_campaign_is_rejected() {
        let harness = TestHarness::builder().build().await.unwrap();
        let contacts = harness
            .add_contacts(&[("Ana", "5511911110000")])
            .await
            .unwrap();
        let campaign_id = queue_campaign(&harness, "Oi", vec![contacts[0].id]).await;
        let dispatcher = dispatcher(&harness, Duration::ZERO);

        dispatcher.run(campaign_id).await.unwrap();
        let again = dispatcher.run(campaign_id).await;
        match again {
            Err(MontandonError::Conflict(reason)) => {
                assert_eq!(reason, format!("campaign {campaign_id} already finished as COMPLETED"));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(harness.messaging.sent_count().await, 1);
        assert_eq!(harness.storage.campaign_logs(campaign_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn spawn_of_finished_campaign_resolves_to_conflict() {
        let harness = TestHarness::builder().build().await.unwrap();
        let campaign_id = queue_campaign(&harness, "Oi", vec![]).await;
        let dispatcher = dispatcher(&harness, Duration::ZERO);
        dispatcher.run(campaign_id).await.unwrap();

        let result = dispatcher.spawn(campaign_id).unwrap().await.unwrap();
        assert!(matches!(result, Err(MontandonError::Conflict(_))), "{result:?}");
        assert!(!dispatcher.is_active(campaign_id));
        let campaign = harness.storage.get_campaign(campaign_id).await.unwrap().unwrap();
        assert_eq!(campaign.status, CampaignStatus::Completed);
    }

    #[tokio::test]
    async fn two_placeholders_across_three_contacts() {
        let harness = TestHarness::builder().build().await.unwrap();
        let mut contacts = harness
            .storage
            .insert_contacts(&[
                NewContact {
                    name: "A".into(),
                    phone: "5511911110000".into(),
                    address: Some("Campinas".into()),
                    category: None,
                    google_maps_link: None,
                },
                NewContact {
                    name: "C".into(),
                    phone: "5511933330000".into(),
                    address: Some("Santos".into()),
                    category: None,
                    google_maps_link: None,
                },
            ])
            .await
            .unwrap();
        // No address on this one.
        let b = harness
            .add_contacts(&[("B", "5511922220000")])
            .await
            .unwrap()
            .remove(0);
        contacts.insert(1, b);
        harness.messaging.fail_for("5511933330000").await;
        let campaign_id = queue_campaign(
            &harness,
            "Oi {nome} de {cidade}",
            contacts.iter().map(|c| c.id).collect(),
        )
        .await;
        let queued = harness.storage.get_campaign(campaign_id).await.unwrap().unwrap();
        assert_eq!(queued.status, CampaignStatus::Queued);

        let dispatcher = dispatcher(&harness, Duration::from_millis(150));
        let handle = dispatcher.spawn(campaign_id).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let running = harness.storage.get_campaign(campaign_id).await.unwrap().unwrap();
        assert_eq!(running.status, CampaignStatus::Running);

        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed { sent: 2, failed: 1 });

        let sent = harness.messaging.sent_messages().await;
        let bodies: Vec<&str> = sent.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["Oi A de Campinas", "Oi B de ", "Oi C de Santos"]);

        let logs = harness.storage.campaign_logs(campaign_id).await.unwrap();
        assert_eq!(logs.len(), 3);
        for (log, contact) in logs.iter().zip(&contacts) {
            assert_eq!(log.contact_id, contact.id);
            let stored = harness.storage.get_contact(contact.id).await.unwrap().unwrap();
            assert_eq!(stored.status, ContactStatus::from(log.status));
        }
        assert_eq!(logs[2].status, LogStatus::Error);

        let done = harness.storage.get_campaign(campaign_id).await.unwrap().unwrap();
        assert_eq!(done.status, CampaignStatus::Completed);
    }

    #[tokio::test]
    async fn concurrent_spawn_is_rejected_in_process() {
        let harness = TestHarness::builder().build().await.unwrap();
        let contacts = harness
            .add_contacts(&[("Ana", "5511911110000"), ("Bia", "5511922220000")])
            .await
            .unwrap();
        let campaign_id =
            queue_campaign(&harness, "Oi", contacts.iter().map(|c| c.id).collect()).await;
        let dispatcher = dispatcher(&harness, Duration::from_millis(200));

        let handle = dispatcher.spawn(campaign_id).unwrap();
        assert!(dispatcher.is_active(campaign_id));
        assert!(matches!(
            dispatcher.spawn(campaign_id),
            Err(MontandonError::Conflict(_))
        ));

        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed { sent: 2, failed: 0 });
        assert!(!dispatcher.is_active(campaign_id));
    }

    #[tokio::test]
    async fn delay_applies_between_sends_only() {
        let harness = TestHarness::builder().build().await.unwrap();
        let contacts = harness
            .add_contacts(&[
                ("Ana", "5511911110000"),
                ("Bia", "5511922220000"),
                ("Caio", "5511933330000"),
            ])
            .await
            .unwrap();
        let campaign_id =
            queue_campaign(&harness, "Oi", contacts.iter().map(|c| c.id).collect()).await;

        let start = tokio::time::Instant::now();
        dispatcher(&harness, Duration::from_millis(100))
            .run(campaign_id)
            .await
            .unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn contact_deleted_mid_run_aborts_campaign() {
        let harness = TestHarness::builder().build().await.unwrap();
        let contacts = harness
            .add_contacts(&[("Ana", "5511911110000"), ("Bia", "5511922220000")])
            .await
            .unwrap();
        let campaign_id =
            queue_campaign(&harness, "Oi", contacts.iter().map(|c| c.id).collect()).await;
        let dispatcher = dispatcher(&harness, Duration::from_millis(300));

        let handle = dispatcher.spawn(campaign_id).unwrap();
        // The first send happens right away; remove the second target while
        // the run sleeps.
        tokio::time::sleep(Duration::from_millis(100)).await;
        harness.storage.delete_contact(contacts[1].id).await.unwrap();

        let outcome = handle.await.unwrap().unwrap();
        // Targets were loaded before the delete, so the log insert for the
        // second contact hits the foreign key.
        assert!(matches!(outcome, DispatchOutcome::Aborted { .. }), "{outcome:?}");
        let campaign = harness.storage.get_campaign(campaign_id).await.unwrap().unwrap();
        assert_eq!(campaign.status, CampaignStatus::Error);
        assert_eq!(harness.storage.campaign_logs(campaign_id).await.unwrap().len(), 1);
    }
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign and campaign target operations.

use std::collections::HashSet;

use montandon_core::MontandonError;
use montandon_core::types::{Campaign, CampaignStatus, Contact, NewCampaign};
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use crate::database::{Database, map_tr_err, status_column};
use crate::queries::contacts::contact_from_row;

const CAMPAIGN_COLUMNS: &str = "id, name, template_id, status, created_at, updated_at";

fn campaign_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Campaign> {
    Ok(Campaign {
        id: row.get(0)?,
        name: row.get(1)?,
        template_id: row.get(2)?,
        status: status_column(row, 3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn select_campaign(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<Campaign>> {
    conn.query_row(
        &format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = ?1"),
        params![id],
        campaign_from_row,
    )
    .optional()
}

/// Create a campaign in `QUEUED` state with its ordered target list.
///
/// Contact ids that do not exist are dropped. A repeated id keeps its first
/// position. Fails with `NotFound` if the template does not exist.
pub async fn create_campaign(
    db: &Database,
    campaign: &NewCampaign,
) -> Result<Campaign, MontandonError> {
    let campaign = campaign.clone();
    let template_id = campaign.template_id;
    let created = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let template_exists = tx
                .query_row(
                    "SELECT 1 FROM templates WHERE id = ?1",
                    params![campaign.template_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !template_exists {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO campaigns (name, template_id, status) VALUES (?1, ?2, ?3)",
                params![
                    campaign.name,
                    campaign.template_id,
                    CampaignStatus::Queued.to_string()
                ],
            )?;
            let campaign_id = tx.last_insert_rowid();

            let mut targeted = 0_usize;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO campaign_targets (campaign_id, position, contact_id)
                     SELECT ?1, ?2, id FROM contacts WHERE id = ?3",
                )?;
                let mut seen = HashSet::new();
                for contact_id in &campaign.contact_ids {
                    if !seen.insert(*contact_id) {
                        continue;
                    }
                    targeted += insert.execute(params![campaign_id, targeted as i64, contact_id])?;
                }
            }

            let row = select_campaign(&tx, campaign_id)?;
            tx.commit()?;
            debug!(campaign_id, targeted, "campaign created");
            Ok(row)
        })
        .await
        .map_err(map_tr_err)?;
    created.ok_or_else(|| MontandonError::not_found("template", template_id))
}

/// Get a campaign by id.
pub async fn get_campaign(db: &Database, id: i64) -> Result<Option<Campaign>, MontandonError> {
    db.connection()
        .call(move |conn| select_campaign(conn, id))
        .await
        .map_err(map_tr_err)
}

/// List all campaigns, newest first.
pub async fn list_campaigns(db: &Database) -> Result<Vec<Campaign>, MontandonError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], campaign_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// The campaign's target contacts in submission order.
pub async fn campaign_targets(
    db: &Database,
    campaign_id: i64,
) -> Result<Vec<Contact>, MontandonError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name, c.phone, c.address, c.category, c.google_maps_link,
                        c.status, c.created_at, c.updated_at
                 FROM campaign_targets t
                 JOIN contacts c ON c.id = t.contact_id
                 WHERE t.campaign_id = ?1
                 ORDER BY t.position",
            )?;
            let rows = stmt.query_map(params![campaign_id], contact_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Move a campaign from `from` to `to` only if it is currently in `from`.
///
/// Returns whether a row changed. This is the storage half of the run lock:
/// only one caller can win `QUEUED -> RUNNING`.
pub async fn transition_campaign(
    db: &Database,
    id: i64,
    from: CampaignStatus,
    to: CampaignStatus,
) -> Result<bool, MontandonError> {
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE campaigns SET status = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2 AND status = ?3",
                params![to.to_string(), id, from.to_string()],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed == 1)
}

/// Mark every `RUNNING` campaign as `ERROR`.
///
/// Called once at startup: a campaign still running at that point was
/// interrupted by a crash or restart.
pub async fn fail_running_campaigns(db: &Database) -> Result<usize, MontandonError> {
    db.connection()
        .call(|conn| {
            conn.execute(
                "UPDATE campaigns SET status = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE status = ?2",
                params![
                    CampaignStatus::Error.to_string(),
                    CampaignStatus::Running.to_string()
                ],
            )
        })
        .await
        .map_err(map_tr_err)
}

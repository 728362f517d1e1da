// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign log operations. Logs are append-only.

use montandon_core::MontandonError;
use montandon_core::types::{CampaignLog, CampaignLogView, NewCampaignLog};
use rusqlite::params;

use crate::database::{Database, map_tr_err, status_column};

const LOG_COLUMNS: &str = "id, campaign_id, contact_id, status, error_message, sent_at";

fn log_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CampaignLog> {
    Ok(CampaignLog {
        id: row.get(0)?,
        campaign_id: row.get(1)?,
        contact_id: row.get(2)?,
        status: status_column(row, 3)?,
        error_message: row.get(4)?,
        sent_at: row.get(5)?,
    })
}

/// Append one send attempt.
///
/// Fails with `Conflict` if the campaign or contact no longer exists.
pub async fn insert_campaign_log(
    db: &Database,
    log: &NewCampaignLog,
) -> Result<CampaignLog, MontandonError> {
    let log = log.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO campaign_logs (campaign_id, contact_id, status, error_message)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    log.campaign_id,
                    log.contact_id,
                    log.status.to_string(),
                    log.error_message
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {LOG_COLUMNS} FROM campaign_logs WHERE id = ?1"),
                params![id],
                log_from_row,
            )
        })
        .await
        .map_err(map_tr_err)
}

/// All logs joined with campaign and contact names, newest first.
pub async fn list_campaign_logs(db: &Database) -> Result<Vec<CampaignLogView>, MontandonError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.status, l.sent_at, l.error_message, c.name, ct.name
                 FROM campaign_logs l
                 JOIN campaigns c ON c.id = l.campaign_id
                 JOIN contacts ct ON ct.id = l.contact_id
                 ORDER BY l.sent_at DESC, l.id DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(CampaignLogView {
                    id: row.get(0)?,
                    status: status_column(row, 1)?,
                    sent_at: row.get(2)?,
                    error_message: row.get(3)?,
                    campaign_name: row.get(4)?,
                    contact_name: row.get(5)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Logs of one campaign in insertion order.
pub async fn campaign_logs(
    db: &Database,
    campaign_id: i64,
) -> Result<Vec<CampaignLog>, MontandonError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LOG_COLUMNS} FROM campaign_logs WHERE campaign_id = ?1 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![campaign_id], log_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{campaigns, contacts, templates};
    use montandon_core::types::{LogStatus, NewCampaign, NewContact, NewTemplate};
    use tempfile::tempdir;

    async fn setup() -> (Database, tempfile::TempDir, i64, i64) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let template = templates::create_template(
            &db,
            &NewTemplate {
                name: "t".into(),
                content: "hi".into(),
            },
        )
        .await
        .unwrap();
        let contact = contacts::insert_contacts(
            &db,
            &[NewContact {
                name: "Café Central".into(),
                phone: "5511988887777".into(),
                address: None,
                category: None,
                google_maps_link: None,
            }],
        )
        .await
        .unwrap()
        .remove(0);
        let campaign = campaigns::create_campaign(
            &db,
            &NewCampaign {
                name: "spring".into(),
                template_id: template.id,
                contact_ids: vec![contact.id],
            },
        )
        .await
        .unwrap();
        (db, dir, campaign.id, contact.id)
    }

    #[tokio::test]
    async fn insert_and_list_logs() {
        let (db, _dir, campaign_id, contact_id) = setup().await;
        let first = insert_campaign_log(
            &db,
            &NewCampaignLog {
                campaign_id,
                contact_id,
                status: LogStatus::Error,
                error_message: Some("Failed to send via Evolution API".into()),
            },
        )
        .await
        .unwrap();
        let second = insert_campaign_log(
            &db,
            &NewCampaignLog {
                campaign_id,
                contact_id,
                status: LogStatus::Sent,
                error_message: None,
            },
        )
        .await
        .unwrap();

        let views = list_campaign_logs(&db).await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id, second.id);
        assert_eq!(views[0].campaign_name, "spring");
        assert_eq!(views[0].contact_name, "Café Central");
        assert_eq!(views[1].status, LogStatus::Error);

        let own = campaign_logs(&db, campaign_id).await.unwrap();
        assert_eq!(own, vec![first, second]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn log_for_deleted_contact_is_conflict() {
        let (db, _dir, campaign_id, contact_id) = setup().await;
        contacts::delete_contact(&db, contact_id).await.unwrap();
        let result = insert_campaign_log(
            &db,
            &NewCampaignLog {
                campaign_id,
                contact_id,
                status: LogStatus::Sent,
                error_message: None,
            },
        )
        .await;
        assert!(matches!(result, Err(MontandonError::Conflict(_))));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn contact_with_logs_cannot_be_deleted() {
        let (db, _dir, campaign_id, contact_id) = setup().await;
        insert_campaign_log(
            &db,
            &NewCampaignLog {
                campaign_id,
                contact_id,
                status: LogStatus::Sent,
                error_message: None,
            },
        )
        .await
        .unwrap();
        let result = contacts::delete_contact(&db, contact_id).await;
        assert!(matches!(result, Err(MontandonError::Conflict(_))));
        db.close().await.unwrap();
    }
}

// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact CRUD operations.

use montandon_core::MontandonError;
use montandon_core::types::{Contact, ContactStatus, ContactUpdate, NewContact};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err, status_column};

pub(crate) const CONTACT_COLUMNS: &str =
    "id, name, phone, address, category, google_maps_link, status, created_at, updated_at";

/// Map a row selected with [`CONTACT_COLUMNS`] (in that order) to a contact.
pub(crate) fn contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        address: row.get(3)?,
        category: row.get(4)?,
        google_maps_link: row.get(5)?,
        status: status_column(row, 6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn select_contact(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<Contact>> {
    conn.query_row(
        &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
        params![id],
        contact_from_row,
    )
    .optional()
}

/// List contacts ordered by id.
pub async fn list_contacts(
    db: &Database,
    skip: u32,
    limit: u32,
) -> Result<Vec<Contact>, MontandonError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY id LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map(params![limit, skip], contact_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Get a contact by id.
pub async fn get_contact(db: &Database, id: i64) -> Result<Option<Contact>, MontandonError> {
    db.connection()
        .call(move |conn| select_contact(conn, id))
        .await
        .map_err(map_tr_err)
}

/// Insert contacts in a single transaction, skipping phones that already
/// exist. A phone repeated within the batch is inserted once, at its first
/// occurrence.
pub async fn insert_contacts(
    db: &Database,
    contacts: &[NewContact],
) -> Result<Vec<Contact>, MontandonError> {
    let contacts = contacts.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut created = Vec::new();
            {
                let mut insert = tx.prepare(
                    "INSERT INTO contacts (name, phone, address, category, google_maps_link, status)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(phone) DO NOTHING",
                )?;
                for contact in &contacts {
                    let inserted = insert.execute(params![
                        contact.name,
                        contact.phone,
                        contact.address,
                        contact.category,
                        contact.google_maps_link,
                        ContactStatus::Pending.to_string(),
                    ])?;
                    if inserted == 1 {
                        let id = tx.last_insert_rowid();
                        if let Some(row) = select_contact(&tx, id)? {
                            created.push(row);
                        }
                    }
                }
            }
            tx.commit()?;
            Ok(created)
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial update. Returns `None` if the contact does not exist.
pub async fn update_contact(
    db: &Database,
    id: i64,
    update: &ContactUpdate,
) -> Result<Option<Contact>, MontandonError> {
    let update = update.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE contacts SET
                    name = COALESCE(?1, name),
                    phone = COALESCE(?2, phone),
                    status = COALESCE(?3, status),
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?4",
                params![
                    update.name,
                    update.phone,
                    update.status.map(|s| s.to_string()),
                    id
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_contact(conn, id)
        })
        .await
        .map_err(map_tr_err)
}

/// Set a contact's status, failing with `NotFound` if the row is gone.
pub async fn set_contact_status(
    db: &Database,
    id: i64,
    status: ContactStatus,
) -> Result<(), MontandonError> {
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE contacts SET status = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![status.to_string(), id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(MontandonError::not_found("contact", id));
    }
    Ok(())
}

/// Delete a contact. Returns false if it did not exist.
///
/// A contact referenced by campaign logs cannot be deleted; that surfaces as
/// a conflict.
pub async fn delete_contact(db: &Database, id: i64) -> Result<bool, MontandonError> {
    db.connection()
        .call(move |conn| conn.execute("DELETE FROM contacts WHERE id = ?1", params![id]))
        .await
        .map(|deleted| deleted > 0)
        .map_err(|e| match map_tr_err(e) {
            MontandonError::Conflict(_) => {
                MontandonError::Conflict(format!("contact {id} has campaign logs"))
            }
            other => other,
        })
}

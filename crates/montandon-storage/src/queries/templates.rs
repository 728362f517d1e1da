// SPDX-FileCopyrightText: 2026 Montandon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template CRUD operations.

use montandon_core::MontandonError;
use montandon_core::types::{NewTemplate, Template};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};

fn template_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Template> {
    Ok(Template {
        id: row.get(0)?,
        name: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn select_template(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<Template>> {
    conn.query_row(
        "SELECT id, name, content, created_at FROM templates WHERE id = ?1",
        params![id],
        template_from_row,
    )
    .optional()
}

/// List all templates ordered by id.
pub async fn list_templates(db: &Database) -> Result<Vec<Template>, MontandonError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, content, created_at FROM templates ORDER BY id")?;
            let rows = stmt.query_map([], template_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Get a template by id.
pub async fn get_template(db: &Database, id: i64) -> Result<Option<Template>, MontandonError> {
    db.connection()
        .call(move |conn| select_template(conn, id))
        .await
        .map_err(map_tr_err)
}

/// Create a template. A duplicate name is a conflict.
pub async fn create_template(
    db: &Database,
    template: &NewTemplate,
) -> Result<Template, MontandonError> {
    let template = template.clone();
    let name = template.name.clone();
    let created = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO templates (name, content) VALUES (?1, ?2)",
                params![template.name, template.content],
            )?;
            select_template(conn, conn.last_insert_rowid())
        })
        .await
        .map_err(|e| match map_tr_err(e) {
            MontandonError::Conflict(_) => {
                MontandonError::Conflict(format!("template `{name}` already exists"))
            }
            other => other,
        })?;
    created.ok_or_else(|| MontandonError::Internal("inserted template not readable".into()))
}

/// Delete a template. Returns false if it did not exist.
///
/// Templates referenced by a campaign cannot be deleted.
pub async fn delete_template(db: &Database, id: i64) -> Result<bool, MontandonError> {
    db.connection()
        .call(move |conn| conn.execute("DELETE FROM templates WHERE id = ?1", params![id]))
        .await
        .map(|deleted| deleted > 0)
        .map_err(|e| match map_tr_err(e) {
            MontandonError::Conflict(_) => {
                MontandonError::Conflict(format!("template {id} is used by a campaign"))
            }
            other => other,
        })
}

//! `check-schema`: compare the live schema against the tables and columns
//! the services read and write.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use gestion_db::DbPool;

const EXPECTED: &[(&str, &[&str])] = &[
    ("roles", &["id", "name", "description"]),
    ("areas_trabajo", &["id", "name", "description"]),
    (
        "usuarios",
        &[
            "id",
            "name",
            "email",
            "password_hash",
            "role_id",
            "work_area_id",
            "bio",
            "birth_date",
            "phone",
            "is_active",
            "last_login_at",
            "failed_login_count",
            "locked_until",
        ],
    ),
    (
        "sesiones_usuario",
        &["id", "user_id", "refresh_token_hash", "expires_at", "is_revoked"],
    ),
    ("estados_proyecto", &["id", "name"]),
    ("estados_entregable", &["id", "name"]),
    (
        "proyectos",
        &[
            "id",
            "title",
            "description",
            "status_id",
            "student_id",
            "director_id",
            "work_area_id",
            "created_by",
        ],
    ),
    (
        "proyecto_usuarios",
        &["id", "project_id", "user_id", "role_in_project", "status", "joined_at"],
    ),
    (
        "entregables",
        &[
            "id",
            "project_id",
            "phase",
            "title",
            "description",
            "status_id",
            "original_file",
            "submitted_file",
            "assignee_id",
            "due_date",
            "submitted_at",
            "reviewed_at",
            "feedback",
        ],
    ),
    (
        "historial_entregables",
        &["id", "deliverable_id", "from_status_id", "to_status_id", "changed_by", "note"],
    ),
    (
        "invitaciones",
        &[
            "id",
            "project_id",
            "code",
            "role_in_project",
            "max_uses",
            "uses",
            "expires_at",
            "revoked_at",
            "created_by",
            "last_accepted_at",
        ],
    ),
];

/// Columns every table carries for auditing.
const TIMESTAMP_COLUMNS: &[&str] = &["created_at", "updated_at"];

pub async fn check_schema(pool: &DbPool) -> Result<()> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name::text, column_name::text
         FROM information_schema.columns
         WHERE table_schema = current_schema()",
    )
    .fetch_all(pool)
    .await?;

    let mut actual: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (table, column) in rows {
        actual.entry(table).or_default().insert(column);
    }

    let missing = missing_items(&actual);
    if missing.is_empty() {
        println!("Schema OK: {} tables checked", EXPECTED.len());
        return Ok(());
    }

    for item in &missing {
        println!("MISSING {item}");
    }
    bail!("{} schema item(s) missing", missing.len())
}

/// Expected tables and columns absent from `actual`, as `table` or `table.column`.
fn missing_items(actual: &BTreeMap<String, BTreeSet<String>>) -> Vec<String> {
    let mut missing = Vec::new();
    for (table, columns) in EXPECTED {
        let Some(present) = actual.get(*table) else {
            missing.push(format!("table {table}"));
            continue;
        };
        for column in columns.iter().chain(TIMESTAMP_COLUMNS) {
            if !present.contains(*column) {
                missing.push(format!("column {table}.{column}"));
            }
        }
    }
    missing
}

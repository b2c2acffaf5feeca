// src/forms/queries.rs
//! Reads of the form configuration shared by the form and intake handlers

use sqlx::{SqliteExecutor, SqlitePool};
use std::collections::HashMap;

use super::models::{FormField, OrderedSections, FIELD_COLUMNS};

pub async fn all_fields<'e>(executor: impl SqliteExecutor<'e>) -> Result<Vec<FormField>, sqlx::Error> {
    sqlx::query_as::<_, FormField>(&format!(
        "SELECT {} FROM form_config ORDER BY COALESCE(field_order, 0), id",
        FIELD_COLUMNS
    ))
    .fetch_all(executor)
    .await
}

pub async fn field_by_id<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<FormField>, sqlx::Error> {
    sqlx::query_as::<_, FormField>(&format!(
        "SELECT {} FROM form_config WHERE id = ?",
        FIELD_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Appends a section row for `name` unless one exists
pub async fn ensure_section<'e>(executor: impl SqliteExecutor<'e>, name: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO form_sections (name, section_order, description, icon)
        SELECT ?, COALESCE(MAX(section_order), 0) + 1, '', 'folder' FROM form_sections
        "#,
    )
    .bind(name)
    .execute(executor)
    .await?;
    Ok(())
}

/// Fields grouped by subsection.
///
/// Sections follow `form_sections.section_order` with unknown sections last;
/// without any section rows they follow the smallest `field_order` inside
/// each group. Fields keep `field_order, id` order within a section.
pub async fn ordered_sections(pool: &SqlitePool) -> Result<OrderedSections, sqlx::Error> {
    let section_rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT name, COALESCE(section_order, 0) FROM form_sections ORDER BY section_order",
    )
    .fetch_all(pool)
    .await?;
    let fields = all_fields(pool).await?;

    Ok(group_fields(fields, &section_rows.into_iter().collect()))
}

pub fn group_fields(fields: Vec<FormField>, section_order: &HashMap<String, i64>) -> OrderedSections {
    let mut groups: Vec<(String, Vec<FormField>)> = Vec::new();
    for field in fields {
        let key = field.subsection.clone().unwrap_or_default();
        match groups.iter_mut().find(|(name, _)| *name == key) {
            Some((_, members)) => members.push(field),
            None => groups.push((key, vec![field])),
        }
    }

    if section_order.is_empty() {
        groups.sort_by_key(|(_, members)| {
            members.iter().map(|f| f.field_order).min().unwrap_or(0)
        });
    } else {
        groups.sort_by_key(|(name, _)| section_order.get(name).copied().unwrap_or(i64::MAX));
    }

    OrderedSections(groups)
}

// src/applications/store.rs
//! Row access for the dynamically shaped `applications` table

use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqliteConnection, SqliteExecutor, TypeInfo, ValueRef};
use std::collections::HashMap;

use crate::common::helpers::quote_ident;
use crate::forms::schema::APPLICATIONS_TABLE;

/// One application with whatever columns the table currently has
pub type ApplicationRow = Map<String, Value>;

pub const DEFAULT_STATUS: &str = "Applied";

/// Decodes a row by the storage class of each value
pub fn row_to_map(row: &SqliteRow) -> ApplicationRow {
    let mut map = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = match row.try_get_raw(index) {
            Ok(raw) if raw.is_null() => Value::Null,
            Ok(raw) => match raw.type_info().name() {
                "INTEGER" => row
                    .try_get_unchecked::<i64, _>(index)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                "REAL" => row
                    .try_get_unchecked::<f64, _>(index)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                "BLOB" => Value::Null,
                _ => row
                    .try_get_unchecked::<String, _>(index)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
            },
            Err(_) => Value::Null,
        };
        map.insert(column.name().to_string(), value);
    }
    map
}

pub async fn all_applications<'e>(
    executor: impl SqliteExecutor<'e>,
) -> Result<Vec<ApplicationRow>, sqlx::Error> {
    let rows = sqlx::query(&format!("SELECT * FROM {} ORDER BY id", APPLICATIONS_TABLE))
        .fetch_all(executor)
        .await?;
    Ok(rows.iter().map(row_to_map).collect())
}

pub async fn application_by_id<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT * FROM {} WHERE id = ?", APPLICATIONS_TABLE))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(row.as_ref().map(row_to_map))
}

pub async fn email_exists<'e>(executor: impl SqliteExecutor<'e>, email: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(&format!(
        "SELECT id FROM {} WHERE lower(email) = lower(?) LIMIT 1",
        APPLICATIONS_TABLE
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;
    Ok(found.is_some())
}

/// Inserts `(column, value)` pairs; column names must already be validated
pub async fn insert_application(
    conn: &mut SqliteConnection,
    values: &[(String, String)],
) -> Result<i64, sqlx::Error> {
    let columns = values
        .iter()
        .map(|(c, _)| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; values.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        APPLICATIONS_TABLE, columns, placeholders
    );

    let mut query = sqlx::query(&sql);
    for (_, value) in values {
        query = query.bind(value);
    }
    let result = query.execute(&mut *conn).await?;
    Ok(result.last_insert_rowid())
}

/// Hiring status per lower-cased applicant email
pub async fn status_map<'e>(
    executor: impl SqliteExecutor<'e>,
) -> Result<HashMap<String, String>, sqlx::Error> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT lower(email), status FROM statuses")
            .fetch_all(executor)
            .await?;
    Ok(rows.into_iter().collect())
}

pub async fn status_for<'e>(executor: impl SqliteExecutor<'e>, email: &str) -> Result<String, sqlx::Error> {
    let status: Option<String> =
        sqlx::query_scalar("SELECT status FROM statuses WHERE email = lower(?)")
            .bind(email)
            .fetch_optional(executor)
            .await?;
    Ok(status.unwrap_or_else(|| DEFAULT_STATUS.to_string()))
}

/// Text value of a column, empty when missing or null
pub fn text_value(row: &ApplicationRow, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

// src/forms/schema.rs
//! Dynamic column management for the shared `applications` table
//!
//! Every configurable form field is backed by one TEXT column. Adding a field
//! runs `ALTER TABLE ... ADD COLUMN`; removing one rebuilds the table without
//! the column, keeping the primary key, the unique email constraint and the
//! submission timestamp default intact.

use regex::Regex;
use sqlx::{SqliteConnection, SqliteExecutor};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::common::{helpers::quote_ident, ApiError};

pub const APPLICATIONS_TABLE: &str = "applications";

/// Columns the intake flow depends on; never dropped
pub const CORE_COLUMNS: [&str; 5] = ["id", "name", "email", "submission_timestamp", "resume_path"];

/// Names a new field may not take, compared case-insensitively
const RESERVED_COLUMNS: [&str; 4] = ["id", "submission_timestamp", "resume_path", "status"];

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid field name '{0}': use a lowercase letter followed by letters, digits or underscores (max 63 characters)")]
    InvalidColumnName(String),

    #[error("Field name '{0}' is reserved")]
    ReservedColumn(String),

    #[error("A column named '{0}' already exists in the database.")]
    DuplicateColumn(String),

    #[error("Core fields cannot be deleted.")]
    CoreColumn(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::InvalidColumnName(_) | SchemaError::ReservedColumn(_) => {
                ApiError::ValidationError(err.to_string())
            }
            SchemaError::DuplicateColumn(_) => ApiError::Conflict(err.to_string()),
            SchemaError::CoreColumn(_) => ApiError::BadRequest(err.to_string()),
            SchemaError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}

fn column_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]{0,62}$").expect("valid column regex"))
}

/// Normalizes an admin-entered field name: trimmed, spaces to `_`, lowercase
pub fn normalize_field_name(raw: &str) -> String {
    raw.trim().replace(' ', "_").to_lowercase()
}

/// Checks that a name is safe to use as a dynamic column
pub fn validate_column_name(name: &str) -> Result<(), SchemaError> {
    if !column_name_pattern().is_match(name) {
        return Err(SchemaError::InvalidColumnName(name.to_string()));
    }
    if RESERVED_COLUMNS.iter().any(|r| r.eq_ignore_ascii_case(name)) {
        return Err(SchemaError::ReservedColumn(name.to_string()));
    }
    Ok(())
}

pub fn is_core_column(name: &str) -> bool {
    CORE_COLUMNS.iter().any(|c| c.eq_ignore_ascii_case(name))
}

/// Column names of a table in declaration order (empty if the table is missing)
pub async fn table_columns<'e>(
    executor: impl SqliteExecutor<'e>,
    table: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?) ORDER BY cid")
        .bind(table)
        .fetch_all(executor)
        .await
}

pub async fn application_columns<'e>(
    executor: impl SqliteExecutor<'e>,
) -> Result<Vec<String>, sqlx::Error> {
    table_columns(executor, APPLICATIONS_TABLE).await
}

/// Adds a TEXT column for a form field. Fails with `DuplicateColumn` if present.
pub async fn add_application_column(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<(), SchemaError> {
    validate_column_name(name)?;

    let existing = application_columns(&mut *conn).await?;
    if existing.iter().any(|c| c.eq_ignore_ascii_case(name)) {
        return Err(SchemaError::DuplicateColumn(name.to_string()));
    }

    let ddl = format!(
        "ALTER TABLE {} ADD COLUMN {} TEXT",
        APPLICATIONS_TABLE,
        quote_ident(name)
    );
    sqlx::query(&ddl).execute(&mut *conn).await.map_err(|e| {
        if e.to_string().contains("duplicate column name") {
            SchemaError::DuplicateColumn(name.to_string())
        } else {
            SchemaError::Database(e)
        }
    })?;

    info!(column = %name, "Added column to applications table");
    Ok(())
}

/// Adds the column only when it is missing. Used by startup reconciliation,
/// where seeded names are trusted but still validated.
pub async fn ensure_application_column(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<bool, SchemaError> {
    match add_application_column(conn, name).await {
        Ok(()) => Ok(true),
        Err(SchemaError::DuplicateColumn(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

fn column_definition(name: &str) -> String {
    match name {
        "id" => "\"id\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
        "email" => "\"email\" TEXT UNIQUE".to_string(),
        "submission_timestamp" => {
            "\"submission_timestamp\" DATETIME DEFAULT CURRENT_TIMESTAMP".to_string()
        }
        other => format!("{} TEXT", quote_ident(other)),
    }
}

/// Builds the CREATE TABLE statement for an applications table with `columns`
pub fn applications_table_ddl(table: &str, columns: &[String]) -> String {
    let defs: Vec<String> = columns.iter().map(|c| column_definition(c)).collect();
    format!("CREATE TABLE {} ({})", table, defs.join(", "))
}

/// Removes a dynamic column by rebuilding the table.
///
/// Must run inside a transaction owned by the caller; the connection is left
/// with the new table in place. Returns `false` when the column did not exist.
pub async fn drop_application_column(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<bool, SchemaError> {
    if is_core_column(name) {
        return Err(SchemaError::CoreColumn(name.to_string()));
    }

    let columns = application_columns(&mut *conn).await?;
    if !columns.iter().any(|c| c == name) {
        debug!(column = %name, "Column not present, skipping table rebuild");
        return Ok(false);
    }

    let keep: Vec<String> = columns.into_iter().filter(|c| c != name).collect();
    let column_list = keep
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    sqlx::query("DROP TABLE IF EXISTS applications_new")
        .execute(&mut *conn)
        .await?;
    sqlx::query(&applications_table_ddl("applications_new", &keep))
        .execute(&mut *conn)
        .await?;
    sqlx::query(&format!(
        "INSERT INTO applications_new ({cols}) SELECT {cols} FROM {table}",
        cols = column_list,
        table = APPLICATIONS_TABLE
    ))
    .execute(&mut *conn)
    .await?;
    sqlx::query(&format!("DROP TABLE {}", APPLICATIONS_TABLE))
        .execute(&mut *conn)
        .await?;
    sqlx::query(&format!(
        "ALTER TABLE applications_new RENAME TO {}",
        APPLICATIONS_TABLE
    ))
    .execute(&mut *conn)
    .await?;

    info!(column = %name, remaining_columns = keep.len(), "Rebuilt applications table without column");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_support::memory_pool;

    async fn pool_with_applications() -> sqlx::SqlitePool {
        let pool = memory_pool().await;
        let base: Vec<String> = CORE_COLUMNS.iter().map(|c| c.to_string()).collect();
        sqlx::query(&applications_table_ddl(APPLICATIONS_TABLE, &base))
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[test]
    fn test_normalize_field_name() {
        assert_eq!(normalize_field_name("  Notice Period "), "notice_period");
        assert_eq!(normalize_field_name("LinkedIn"), "linkedin");
    }

    #[test]
    fn test_validate_column_name() {
        assert!(validate_column_name("notice_period").is_ok());
        assert!(validate_column_name("q2").is_ok());
        assert!(matches!(
            validate_column_name("1st"),
            Err(SchemaError::InvalidColumnName(_))
        ));
        assert!(matches!(
            validate_column_name("x; DROP TABLE users"),
            Err(SchemaError::InvalidColumnName(_))
        ));
        assert!(matches!(
            validate_column_name("status"),
            Err(SchemaError::ReservedColumn(_))
        ));
        assert!(validate_column_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_applications_ddl_keeps_constraints() {
        let ddl = applications_table_ddl(
            "applications_new",
            &["id".to_string(), "email".to_string(), "gender".to_string()],
        );
        assert!(ddl.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(ddl.contains("\"email\" TEXT UNIQUE"));
        assert!(ddl.contains("\"gender\" TEXT"));
    }

    #[tokio::test]
    async fn test_add_and_drop_column_preserves_rows() {
        let pool = pool_with_applications().await;
        let mut conn = pool.acquire().await.unwrap();

        add_application_column(&mut conn, "gender").await.unwrap();
        add_application_column(&mut conn, "hobbies").await.unwrap();
        sqlx::query("INSERT INTO applications (name, email, gender, hobbies) VALUES ('Ann', 'ann@example.com', 'Female', 'chess')")
            .execute(&mut *conn)
            .await
            .unwrap();

        assert!(drop_application_column(&mut conn, "gender").await.unwrap());

        let columns = application_columns(&mut *conn).await.unwrap();
        assert!(!columns.contains(&"gender".to_string()));
        assert!(columns.contains(&"hobbies".to_string()));

        let (name, hobbies): (String, String) =
            sqlx::query_as("SELECT name, hobbies FROM applications WHERE email = 'ann@example.com'")
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(name, "Ann");
        assert_eq!(hobbies, "chess");

        // unique email survives the rebuild
        let dup = sqlx::query("INSERT INTO applications (name, email) VALUES ('Ann 2', 'ann@example.com')")
            .execute(&mut *conn)
            .await;
        assert!(dup.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_column_rejected() {
        let pool = pool_with_applications().await;
        let mut conn = pool.acquire().await.unwrap();

        add_application_column(&mut conn, "gender").await.unwrap();
        let err = add_application_column(&mut conn, "gender").await.unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn(_)));

        assert!(!ensure_application_column(&mut conn, "gender").await.unwrap());
        assert!(ensure_application_column(&mut conn, "nationality").await.unwrap());
    }

    #[tokio::test]
    async fn test_core_column_cannot_be_dropped() {
        let pool = pool_with_applications().await;
        let mut conn = pool.acquire().await.unwrap();

        let err = drop_application_column(&mut conn, "email").await.unwrap_err();
        assert!(matches!(err, SchemaError::CoreColumn(_)));
        assert!(!drop_application_column(&mut conn, "missing").await.unwrap());
    }
}

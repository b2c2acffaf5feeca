// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::config::AppConfig;
use crate::auth::password::hash_password;
use crate::forms::defaults::default_fields;
use crate::forms::schema::{
    application_columns, applications_table_ddl, ensure_application_column, table_columns,
    APPLICATIONS_TABLE, CORE_COLUMNS,
};

/// Run all database migrations
///
/// Tables are created when missing and older layouts are upgraded in place
/// with explicit column checks. `RESET_DB=true` drops everything first.
pub async fn run_migrations(pool: &SqlitePool, config: &AppConfig) -> anyhow::Result<()> {
    if config.reset_db {
        warn!("RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("Dropped old tables");
    } else {
        info!("Skipping table drop (RESET_DB not set). Tables will be created if they don't exist.");
    }

    create_account_tables(pool).await?;
    create_form_tables(pool).await?;
    create_application_table(pool).await?;
    migrate_form_config_columns(pool).await?;
    migrate_application_columns(pool).await?;
    seed_default_form(pool).await?;
    seed_form_sections(pool).await?;
    reconcile_field_columns(pool).await?;
    ensure_default_admin(pool, config).await?;

    info!("Database migration completed successfully");
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let tables = vec![
        "applications_new",
        "applications",
        "form_sections",
        "form_config",
        "statuses",
        "users",
    ];

    for table in tables {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    Ok(())
}

async fn create_account_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL CHECK(role IN ('admin', 'viewer'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Hiring status is keyed by applicant email, independent of the application row
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS statuses (
            email TEXT PRIMARY KEY,
            name TEXT,
            status TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_form_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS form_config (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            label TEXT NOT NULL,
            type TEXT NOT NULL,
            subsection TEXT,
            options TEXT,
            required BOOLEAN NOT NULL DEFAULT 0,
            is_core BOOLEAN NOT NULL DEFAULT 0,
            field_order INTEGER DEFAULT 0,
            validations TEXT DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS form_sections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            section_order INTEGER DEFAULT 0,
            description TEXT,
            icon TEXT DEFAULT 'folder',
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_application_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let core: Vec<String> = CORE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let ddl = applications_table_ddl(APPLICATIONS_TABLE, &core)
        .replacen("CREATE TABLE", "CREATE TABLE IF NOT EXISTS", 1);
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

/// Older databases predate sections, ordering and validation rules
async fn migrate_form_config_columns(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let columns = table_columns(pool, "form_config").await?;

    let migrations = [
        ("subsection", "ALTER TABLE form_config ADD COLUMN subsection TEXT"),
        (
            "field_order",
            "ALTER TABLE form_config ADD COLUMN field_order INTEGER DEFAULT 0",
        ),
        (
            "validations",
            "ALTER TABLE form_config ADD COLUMN validations TEXT DEFAULT '{}'",
        ),
    ];

    for (column, ddl) in migrations {
        if !columns.iter().any(|c| c == column) {
            info!(column = %column, "Migrating form_config: adding column");
            sqlx::query(ddl).execute(pool).await?;
        }
    }

    Ok(())
}

async fn migrate_application_columns(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let columns = application_columns(pool).await?;
    if !columns.iter().any(|c| c == "resume_path") {
        info!("Migrating applications: adding 'resume_path' column");
        sqlx::query("ALTER TABLE applications ADD COLUMN resume_path TEXT")
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Populates the default recruitment form when no field is configured yet
async fn seed_default_form(pool: &SqlitePool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(id) FROM form_config")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    info!("Form config is empty. Populating with the default recruitment form...");

    let mut tx = pool.begin().await?;
    let fields = default_fields();
    for (order, field) in fields.iter().enumerate() {
        ensure_application_column(&mut tx, field.name).await?;

        sqlx::query(
            r#"
            INSERT INTO form_config (name, label, type, subsection, options, required, is_core, field_order, validations)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, '{}')
            "#,
        )
        .bind(field.name)
        .bind(field.label)
        .bind(field.field_type.as_str())
        .bind(field.subsection)
        .bind(field.options)
        .bind(field.required)
        .bind(field.is_core)
        .bind(order as i64)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    info!(field_count = fields.len(), "Default form config populated");
    Ok(())
}

/// Gives every subsection already used by a field an explicit section row
async fn seed_form_sections(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM form_sections")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    let subsections: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT subsection FROM form_config
        WHERE subsection IS NOT NULL AND subsection != ''
        GROUP BY subsection
        ORDER BY MIN(field_order), MIN(id)
        "#,
    )
    .fetch_all(pool)
    .await?;

    for (index, name) in subsections.iter().enumerate() {
        sqlx::query(
            "INSERT OR IGNORE INTO form_sections (name, section_order, description, icon) VALUES (?, ?, '', 'folder')",
        )
        .bind(name)
        .bind(index as i64 + 1)
        .execute(pool)
        .await?;
    }

    if !subsections.is_empty() {
        info!(section_count = subsections.len(), "Seeded form sections from field config");
    }
    Ok(())
}

/// Every configured field must have a backing column
async fn reconcile_field_columns(pool: &SqlitePool) -> anyhow::Result<()> {
    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM form_config")
        .fetch_all(pool)
        .await?;

    let mut conn = pool.acquire().await?;
    for name in names {
        match ensure_application_column(&mut conn, &name).await {
            Ok(true) => warn!(column = %name, "Restored missing applications column for configured field"),
            Ok(false) => {}
            Err(e) => warn!(column = %name, error = %e, "Configured field has no usable column"),
        }
    }
    Ok(())
}

async fn ensure_default_admin(pool: &SqlitePool, config: &AppConfig) -> anyhow::Result<()> {
    let admin: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE role = 'admin' LIMIT 1")
        .fetch_optional(pool)
        .await?;
    if admin.is_some() {
        return Ok(());
    }

    info!(email = %super::safe_email_log(&config.admin_email), "No admin user found. Creating default admin");
    let password_hash = hash_password(&config.admin_password)?;
    sqlx::query("INSERT INTO users (email, password_hash, role) VALUES (?, ?, 'admin')")
        .bind(&config.admin_email)
        .bind(&password_hash)
        .execute(pool)
        .await?;

    Ok(())
}

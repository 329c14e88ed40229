use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Minimal schema bootstrap: reference tables, the KPI fact table with
/// its composite-identity unique index, and the region mapping.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS a001_department (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a002_segment (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL DEFAULT '',
        name TEXT NOT NULL,
        department_id TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a003_kpi_definition (
        id TEXT PRIMARY KEY NOT NULL,
        department_id TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT 'overall',
        name TEXT NOT NULL,
        unit TEXT NOT NULL DEFAULT '',
        is_calculated INTEGER NOT NULL DEFAULT 0,
        formula TEXT,
        display_order INTEGER NOT NULL DEFAULT 0,
        is_visible INTEGER NOT NULL DEFAULT 1
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a004_kpi_value (
        id TEXT PRIMARY KEY NOT NULL,
        segment_id TEXT NOT NULL,
        kpi_id TEXT NOT NULL,
        date TEXT NOT NULL,
        value REAL NOT NULL,
        is_target INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT
    );
    "#,
    // At most one fact per (segment, kpi, month, target-flag)
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_a004_identity
        ON a004_kpi_value (segment_id, kpi_id, date, is_target);
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_a004_date
        ON a004_kpi_value (date);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS a005_region (
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        display_order INTEGER NOT NULL DEFAULT 0
    );
    "#,
    // One region per segment, latest assignment wins
    r#"
    CREATE TABLE IF NOT EXISTS a005_store_region (
        segment_id TEXT PRIMARY KEY NOT NULL,
        region_id TEXT NOT NULL
    );
    "#,
];

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/kpi.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    for statement in SCHEMA {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            statement.to_string(),
        ))
        .await?;
    }
    tracing::info!("Database schema ready at {}", normalized);

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

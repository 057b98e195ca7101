//! Database module for SQLite persistence.
//!
//! A single `records` table holds superheroes and countries alike; `autor`
//! tells them apart.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;

use crate::mapper;

/// Schema version written once all migrations have run.
pub const SCHEMA_VERSION: i64 = 2;

/// Initialize the database connection pool and run migrations.
///
/// `import_author` tags the country records the legacy backfill may touch.
pub async fn init_database(
    db_path: &Path,
    import_author: &str,
) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool, import_author).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool, import_author: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            migrated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO meta (id, schema_version, migrated_at)
        VALUES (1, 1, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            id TEXT PRIMARY KEY,
            nombre_super_heroe TEXT NOT NULL,
            nombre_real TEXT NOT NULL,
            edad REAL NOT NULL DEFAULT 0,
            planeta_origen TEXT NOT NULL DEFAULT '',
            debilidad TEXT NOT NULL DEFAULT '',
            poderes TEXT NOT NULL DEFAULT '[]',
            aliados TEXT NOT NULL DEFAULT '[]',
            enemigos TEXT NOT NULL DEFAULT '[]',
            area REAL,
            autor TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_records_autor ON records(autor);
        CREATE INDEX IF NOT EXISTS idx_records_created_at ON records(created_at);
        "#,
    )
    .execute(pool)
    .await?;

    let row = sqlx::query("SELECT schema_version FROM meta WHERE id = 1")
        .fetch_one(pool)
        .await?;
    let version: i64 = row.get("schema_version");

    if version < 2 {
        let backfilled = migrate_legacy_area(pool, import_author).await?;
        tracing::info!(backfilled, "Migrated records to schema v2");
    }

    Ok(())
}

/// Schema v1 -> v2: copy the area out of the `poderes` encoding into the
/// direct `area` column. Only records tagged with `import_author` are
/// countries; superheroes are never touched. Records whose encoding cannot
/// be read keep a NULL area and still display through the legacy fallback.
pub async fn migrate_legacy_area(
    pool: &SqlitePool,
    import_author: &str,
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query("SELECT id, poderes FROM records WHERE area IS NULL AND autor = ?")
        .bind(import_author)
        .fetch_all(&mut *tx)
        .await?;

    let mut backfilled = 0;
    for row in &rows {
        let poderes: String = row.get("poderes");
        let Some(area) = mapper::decode_area(&repository::parse_json_array(&poderes)) else {
            continue;
        };
        let id: String = row.get("id");
        sqlx::query("UPDATE records SET area = ? WHERE id = ?")
            .bind(area)
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        backfilled += 1;
    }

    sqlx::query("UPDATE meta SET schema_version = ?, migrated_at = datetime('now') WHERE id = 1")
        .bind(SCHEMA_VERSION)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(backfilled)
}

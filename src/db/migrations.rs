//! Database initialization: pool setup, pragmas and the embedded schema.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Open (creating if needed) the SQLite database and apply the schema.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _meta| Box::pin(configure_connection(conn)))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    apply_schema(&pool).await?;

    info!(path = db_path, "database ready");
    Ok(pool)
}

/// Apply the embedded schema. Every statement is IF NOT EXISTS /
/// OR IGNORE, so re-running is harmless.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = SCHEMA_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("schema applied");
    Ok(())
}

/// Per-connection pragmas.
///
/// WAL lets the session tick task write while handlers read;
/// busy_timeout covers the brief writer-vs-writer overlaps that remain.
async fn configure_connection(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    // Setting journal_mode returns the mode actually in effect.
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    info!(journal_mode = row.get::<String, _>(0), "sqlite connection configured");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_temp_db() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_init_db_creates_file_and_answers() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("nested/dir/test.db")
            .to_string_lossy()
            .to_string();

        let pool = init_db(&db_path).await.expect("init_db failed");
        assert!(Path::new(&db_path).exists());

        let row: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn test_schema_creates_all_tables() {
        let (pool, _temp) = open_temp_db().await;

        for table in ["players", "referrals", "task_templates", "task_instances"] {
            let row: (String,) =
                sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
                    .bind(table)
                    .fetch_one(&pool)
                    .await
                    .unwrap_or_else(|_| panic!("missing table {}", table));
            assert_eq!(row.0, table);
        }
    }

    #[tokio::test]
    async fn test_schema_reapplies_without_duplicating_seed() {
        let (pool, _temp) = open_temp_db().await;

        apply_schema(&pool).await.expect("second apply failed");

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM task_templates")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(row.0, 5);
    }

    #[tokio::test]
    async fn test_pragmas_in_effect() {
        let (pool, _temp) = open_temp_db().await;

        let row: (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(row.0, 1);

        let row: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        // WAL is best-effort; some filesystems fall back.
        assert!(
            matches!(row.0.as_str(), "wal" | "delete"),
            "unexpected journal_mode: {}",
            row.0
        );
    }
}

//! Database migrations for boards
//!
//! Each migration is applied atomically and tracked in the
//! `board_schema_version` table.

use super::StoreError;
use crate::core_board::types::Timestamp;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

/// Current schema version for board storage
pub const CURRENT_BOARD_SCHEMA_VERSION: i32 = 1;

/// Migration descriptor
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub up_sql: &'static str,
}

/// All available migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial boards schema",
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS board_schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            );

            -- Whole board aggregate as a JSON document, guarded by version
            CREATE TABLE IF NOT EXISTS boards (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_by TEXT NOT NULL,
                is_public INTEGER NOT NULL DEFAULT 0,
                version INTEGER NOT NULL DEFAULT 0,
                document TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_boards_created_by ON boards(created_by);

            -- Membership index for "boards shared with me"
            CREATE TABLE IF NOT EXISTS board_members (
                board_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                role TEXT NOT NULL CHECK(role IN ('admin', 'editor', 'viewer')),
                PRIMARY KEY (board_id, user_id),
                FOREIGN KEY (board_id) REFERENCES boards(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_board_members_user ON board_members(user_id);
        "#,
    }]
}

/// Get current schema version from database
fn get_current_version(pool: &Pool<SqliteConnectionManager>) -> Result<i32, StoreError> {
    let conn = pool.get()?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS board_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn.query_row(
        "SELECT MAX(version) FROM board_schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version.unwrap_or(0))
}

/// Run all pending migrations
pub fn migrate(pool: &Pool<SqliteConnectionManager>) -> Result<(), StoreError> {
    let current_version = get_current_version(pool)?;

    let pending: Vec<_> = get_migrations()
        .into_iter()
        .filter(|m| m.version > current_version)
        .collect();

    if pending.is_empty() {
        return Ok(());
    }

    let mut conn = pool.get()?;

    for migration in pending {
        let tx = conn.transaction()?;
        tx.execute_batch(migration.up_sql)?;
        tx.execute(
            "INSERT INTO board_schema_version (version, applied_at) VALUES (?1, ?2)",
            params![migration.version, Timestamp::now().as_millis() as i64],
        )?;
        tx.commit()?;

        tracing::info!(
            version = migration.version,
            description = migration.description,
            "applied board schema migration"
        );
    }

    Ok(())
}

/// Get the latest migration version available
pub fn get_latest_version() -> i32 {
    get_migrations().iter().map(|m| m.version).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_pool() -> Pool<SqliteConnectionManager> {
        let manager = SqliteConnectionManager::memory();
        Pool::builder()
            .max_size(1)
            .build(manager)
            .expect("Failed to create pool")
    }

    #[test]
    fn test_initial_migration() {
        let pool = setup_test_pool();
        migrate(&pool).expect("Migration failed");

        let version = get_current_version(&pool).expect("Failed to get version");
        assert_eq!(version, CURRENT_BOARD_SCHEMA_VERSION);
        assert_eq!(get_latest_version(), CURRENT_BOARD_SCHEMA_VERSION);
    }

    #[test]
    fn test_idempotent_migrations() {
        let pool = setup_test_pool();

        migrate(&pool).expect("First migration failed");
        migrate(&pool).expect("Second migration failed");

        let version = get_current_version(&pool).expect("Failed to get version");
        assert_eq!(version, CURRENT_BOARD_SCHEMA_VERSION);
    }

    #[test]
    fn test_member_rows_cascade_with_board() {
        let pool = setup_test_pool();
        migrate(&pool).expect("Migration failed");

        let conn = pool.get().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();

        conn.execute(
            "INSERT INTO boards (id, name, created_by, document, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params!["b1", "Board", "alice", "{}", 1000i64],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO board_members (board_id, user_id, role) VALUES (?1, ?2, ?3)",
            params!["b1", "bob", "editor"],
        )
        .unwrap();

        conn.execute("DELETE FROM boards WHERE id = ?1", params!["b1"])
            .unwrap();

        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM board_members", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_owner_role_rejected_in_member_index() {
        let pool = setup_test_pool();
        migrate(&pool).expect("Migration failed");

        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO boards (id, name, created_by, document, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params!["b1", "Board", "alice", "{}", 1000i64],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO board_members (board_id, user_id, role) VALUES (?1, ?2, ?3)",
            params!["b1", "alice", "owner"],
        );
        assert!(result.is_err());
    }
}

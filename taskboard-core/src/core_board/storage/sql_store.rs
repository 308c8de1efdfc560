//! SQL-based storage implementation for boards

use super::{migrations, BoardStore, StoreError};
use crate::config::StoreConfig;
use crate::core_board::board::Board;
use crate::core_board::types::{BoardId, UserId};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};
use std::time::Duration;

/// SQLite board store
#[derive(Clone)]
pub struct BoardSqlStore {
    pool: Pool<SqliteConnectionManager>,
}

impl BoardSqlStore {
    /// Create a store on an existing pool and run migrations
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Result<Self, StoreError> {
        migrations::migrate(&pool)?;
        Ok(Self { pool })
    }

    /// Open the database file named in the configuration
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(&config.database_path)
            .with_init(connection_init(config.busy_timeout));
        let pool = Pool::builder().max_size(config.pool_size).build(manager)?;
        Self::new(pool)
    }

    /// Single-connection in-memory store
    pub fn memory() -> Result<Self, StoreError> {
        let manager =
            SqliteConnectionManager::memory().with_init(connection_init(Duration::from_secs(5)));
        let pool = Pool::builder().max_size(1).build(manager)?;
        Self::new(pool)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }
}

fn connection_init(
    busy_timeout: Duration,
) -> impl Fn(&mut rusqlite::Connection) -> Result<(), rusqlite::Error> + Send + Sync + 'static {
    move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    }
}

fn write_member_index(tx: &Transaction<'_>, board: &Board) -> Result<(), StoreError> {
    tx.execute(
        "DELETE FROM board_members WHERE board_id = ?1",
        params![board.id.as_str()],
    )?;
    for member in &board.members {
        tx.execute(
            "INSERT INTO board_members (board_id, user_id, role) VALUES (?1, ?2, ?3)",
            params![board.id.as_str(), member.user_id.as_str(), member.role.as_str()],
        )?;
    }
    Ok(())
}

fn read_document(document: String, version: i64) -> Result<Board, StoreError> {
    let mut board: Board = serde_json::from_str(&document)?;
    board.version = version.max(0) as u64;
    Ok(board)
}

impl BoardStore for BoardSqlStore {
    fn insert_board(&self, board: &Board) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM boards WHERE id = ?1)",
            params![board.id.as_str()],
            |row| row.get(0),
        )?;
        if exists {
            return Err(StoreError::DuplicateBoard(board.id.clone()));
        }

        tx.execute(
            "INSERT INTO boards (id, name, created_by, is_public, version, document, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                board.id.as_str(),
                &board.name,
                board.created_by.as_str(),
                board.is_public,
                board.version as i64,
                serde_json::to_string(board)?,
                board.created_at.as_millis() as i64,
                board.updated_at.as_millis() as i64,
            ],
        )?;
        write_member_index(&tx, board)?;

        tx.commit()?;
        Ok(())
    }

    fn find_board_by_id(&self, board_id: &BoardId) -> Result<Option<Board>, StoreError> {
        let conn = self.conn()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT document, version FROM boards WHERE id = ?1",
                params![board_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        row.map(|(document, version)| read_document(document, version))
            .transpose()
    }

    fn save_board(&self, board: &Board) -> Result<u64, StoreError> {
        let next_version = board.version + 1;
        let mut next = board.clone();
        next.version = next_version;

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let updated = tx.execute(
            "UPDATE boards
             SET name = ?1, is_public = ?2, version = ?3, document = ?4, updated_at = ?5
             WHERE id = ?6 AND version = ?7",
            params![
                &next.name,
                next.is_public,
                next_version as i64,
                serde_json::to_string(&next)?,
                next.updated_at.as_millis() as i64,
                board.id.as_str(),
                board.version as i64,
            ],
        )?;

        if updated == 0 {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM boards WHERE id = ?1)",
                params![board.id.as_str()],
                |row| row.get(0),
            )?;
            return Err(if exists {
                StoreError::VersionConflict {
                    board_id: board.id.clone(),
                    expected: board.version,
                }
            } else {
                StoreError::MissingBoard(board.id.clone())
            });
        }

        write_member_index(&tx, &next)?;
        tx.commit()?;
        Ok(next_version)
    }

    fn find_boards_for_user(&self, user_id: &UserId) -> Result<Vec<Board>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT document, version FROM boards
             WHERE created_by = ?1
                OR id IN (SELECT board_id FROM board_members WHERE user_id = ?1)
             ORDER BY created_at",
        )?;

        let rows = stmt
            .query_map(params![user_id.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(document, version)| read_document(document, version))
            .collect()
    }
}

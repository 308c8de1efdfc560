//! Storage layer for boards
//!
//! Boards are persisted whole. `save_board` is a compare-and-swap on
//! `Board::version`: it succeeds only when the stored version still equals the
//! version the caller loaded, which is what serializes concurrent mutations of
//! one board without any cross-board locking.

pub mod memory_store;
pub mod migrations;
pub mod sql_store;

pub use memory_store::MemoryBoardStore;
pub use migrations::{migrate, CURRENT_BOARD_SCHEMA_VERSION};
pub use sql_store::BoardSqlStore;

use super::board::Board;
use super::types::{BoardId, UserId};

/// Persistence seam for the board aggregate
pub trait BoardStore: Send + Sync {
    /// Insert a newly created board. Fails if the id is taken.
    fn insert_board(&self, board: &Board) -> Result<(), StoreError>;

    fn find_board_by_id(&self, board_id: &BoardId) -> Result<Option<Board>, StoreError>;

    /// Conditionally persist `board`, returning the new version.
    ///
    /// Fails with [`StoreError::VersionConflict`] when someone else saved
    /// since `board` was loaded.
    fn save_board(&self, board: &Board) -> Result<u64, StoreError>;

    /// Boards where `user_id` is the owner or holds a member record
    fn find_boards_for_user(&self, user_id: &UserId) -> Result<Vec<Board>, StoreError>;
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Board {board_id} changed since version {expected}")]
    VersionConflict { board_id: BoardId, expected: u64 },

    #[error("Board {0} already exists")]
    DuplicateBoard(BoardId),

    #[error("Board {0} does not exist")]
    MissingBoard(BoardId),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

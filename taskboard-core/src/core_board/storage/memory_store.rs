//! In-process board store

use super::{BoardStore, StoreError};
use crate::core_board::board::Board;
use crate::core_board::types::{BoardId, UserId};
use std::collections::HashMap;
use std::sync::RwLock;

/// Board store backed by a map, for tests and single-process deployments
#[derive(Debug, Default)]
pub struct MemoryBoardStore {
    boards: RwLock<HashMap<BoardId, Board>>,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.boards.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BoardStore for MemoryBoardStore {
    fn insert_board(&self, board: &Board) -> Result<(), StoreError> {
        let mut boards = self.boards.write().map_err(|_| StoreError::Poisoned)?;
        if boards.contains_key(&board.id) {
            return Err(StoreError::DuplicateBoard(board.id.clone()));
        }
        boards.insert(board.id.clone(), board.clone());
        Ok(())
    }

    fn find_board_by_id(&self, board_id: &BoardId) -> Result<Option<Board>, StoreError> {
        let boards = self.boards.read().map_err(|_| StoreError::Poisoned)?;
        Ok(boards.get(board_id).cloned())
    }

    fn save_board(&self, board: &Board) -> Result<u64, StoreError> {
        let mut boards = self.boards.write().map_err(|_| StoreError::Poisoned)?;
        let stored = boards
            .get_mut(&board.id)
            .ok_or_else(|| StoreError::MissingBoard(board.id.clone()))?;

        if stored.version != board.version {
            return Err(StoreError::VersionConflict {
                board_id: board.id.clone(),
                expected: board.version,
            });
        }

        let mut next = board.clone();
        next.version = board.version + 1;
        *stored = next;
        Ok(board.version + 1)
    }

    fn find_boards_for_user(&self, user_id: &UserId) -> Result<Vec<Board>, StoreError> {
        let boards = self.boards.read().map_err(|_| StoreError::Poisoned)?;
        let mut found: Vec<Board> = boards
            .values()
            .filter(|b| b.is_member(user_id))
            .cloned()
            .collect();
        found.sort_by_key(|b| b.created_at);
        Ok(found)
    }
}

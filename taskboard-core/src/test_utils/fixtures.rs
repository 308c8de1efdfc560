//! Fixtures for boards, members and managers

use crate::core_board::board::{Board, Member};
use crate::core_board::directory::InMemoryDirectory;
use crate::core_board::manager_impl::BoardManagerImpl;
use crate::core_board::permissions::Role;
use crate::core_board::storage::{BoardStore, MemoryBoardStore};
use crate::core_board::token::{InviteTokenSigner, DEFAULT_TOKEN_TTL};
use crate::core_board::types::{Timestamp, UserId};
use std::sync::Arc;

/// Seed of the signer handed out by [`test_signer`]
pub const TEST_SIGNING_SEED: [u8; 32] = [42u8; 32];

/// Builder for boards in a known membership state
pub struct TestBoardBuilder {
    name: String,
    owner: UserId,
    is_public: bool,
    members: Vec<(UserId, Role)>,
}

impl TestBoardBuilder {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            name: "Test Board".to_string(),
            owner: UserId::new(owner),
            is_public: false,
            members: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    pub fn with_member(mut self, user: impl Into<String>, role: Role) -> Self {
        self.members.push((UserId::new(user), role));
        self
    }

    /// Members are written directly, bypassing authorization
    pub fn build(self) -> Board {
        let mut board = Board::new(self.name, self.owner.clone()).expect("valid fixture board name");
        board.is_public = self.is_public;
        let now = Timestamp::now();
        board.members = self
            .members
            .into_iter()
            .map(|(user_id, role)| Member {
                user_id,
                role,
                invited_by: self.owner.clone(),
                invited_at: now,
                joined_at: Some(now),
            })
            .collect();
        board
    }
}

pub fn user(name: &str) -> UserId {
    UserId::new(name)
}

pub fn test_board(owner: &str) -> Board {
    TestBoardBuilder::new(owner).build()
}

pub fn test_signer() -> InviteTokenSigner {
    InviteTokenSigner::from_seed(&TEST_SIGNING_SEED, DEFAULT_TOKEN_TTL)
}

/// Manager over a fresh in-memory store, with the store exposed for direct edits
pub fn test_manager() -> (BoardManagerImpl, Arc<MemoryBoardStore>) {
    let store = Arc::new(MemoryBoardStore::new());
    let manager = manager_over(store.clone());
    (manager, store)
}

/// Manager over any store, using [`test_signer`] and an empty directory
pub fn manager_over(store: Arc<dyn BoardStore>) -> BoardManagerImpl {
    BoardManagerImpl::new(store, test_signer(), Arc::new(InMemoryDirectory::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_board::access::resolve_access;

    #[test]
    fn test_builder_members() {
        let board = TestBoardBuilder::new("alice")
            .with_member("bob", Role::Admin)
            .with_member("carol", Role::Viewer)
            .public()
            .build();

        assert!(board.is_public);
        assert_eq!(board.members.len(), 2);
        assert_eq!(resolve_access(&board, &user("bob")).role, Some(Role::Admin));
        assert_eq!(board.members[1].invited_by, user("alice"));
    }
}

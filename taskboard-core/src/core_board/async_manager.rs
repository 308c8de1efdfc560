//! Async facade over [`BoardManagerImpl`]
//!
//! The store is synchronous (SQLite through r2d2), so each call runs on the
//! blocking pool instead of stalling the async runtime. Every call is
//! independent; there is no lock around the manager.

use super::access::AccessResult;
use super::board::{Board, BoardSettings, Member};
use super::errors::BoardError;
use super::invite::{InviteLink, InviteOptions};
use super::manager::{AcceptedInvite, BoardManager, InviteManager, MemberView, MembershipManager, NewBoard};
use super::manager_impl::BoardManagerImpl;
use super::permissions::Role;
use super::types::{BoardId, LinkId, UserId};
use std::sync::Arc;

/// Cloneable async handle to the board service
#[derive(Clone)]
pub struct AsyncBoardManager {
    manager: Arc<BoardManagerImpl>,
}

impl AsyncBoardManager {
    pub fn new(manager: BoardManagerImpl) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }

    /// Synchronous manager, for callers already off the runtime
    pub fn inner(&self) -> &BoardManagerImpl {
        &self.manager
    }

    async fn run<T, F>(&self, f: F) -> Result<T, BoardError>
    where
        T: Send + 'static,
        F: FnOnce(&BoardManagerImpl) -> Result<T, BoardError> + Send + 'static,
    {
        let manager = Arc::clone(&self.manager);
        tokio::task::spawn_blocking(move || f(manager.as_ref()))
            .await
            .map_err(|e| BoardError::TaskFailed(e.to_string()))?
    }

    pub async fn create_board(&self, new_board: NewBoard, created_by: UserId) -> Result<Board, BoardError> {
        self.run(move |m| m.create_board(new_board, &created_by)).await
    }

    pub async fn get_board(&self, board_id: BoardId, user_id: UserId) -> Result<Board, BoardError> {
        self.run(move |m| m.get_board(&board_id, &user_id)).await
    }

    pub async fn set_visibility(
        &self,
        board_id: BoardId,
        is_public: bool,
        user_id: UserId,
    ) -> Result<Board, BoardError> {
        self.run(move |m| m.set_visibility(&board_id, is_public, &user_id)).await
    }

    pub async fn update_settings(
        &self,
        board_id: BoardId,
        settings: BoardSettings,
        user_id: UserId,
    ) -> Result<BoardSettings, BoardError> {
        self.run(move |m| m.update_settings(&board_id, settings, &user_id)).await
    }

    pub async fn get_access(&self, board_id: BoardId, user_id: UserId) -> Result<AccessResult, BoardError> {
        self.run(move |m| m.get_access(&board_id, &user_id)).await
    }

    pub async fn list_shared_boards(&self, user_id: UserId) -> Result<Vec<Board>, BoardError> {
        self.run(move |m| m.list_shared_boards(&user_id)).await
    }

    pub async fn add_member(
        &self,
        board_id: BoardId,
        target: UserId,
        role: Role,
        invited_by: UserId,
    ) -> Result<Member, BoardError> {
        self.run(move |m| m.add_member(&board_id, &target, role, &invited_by)).await
    }

    pub async fn remove_member(
        &self,
        board_id: BoardId,
        target: UserId,
        removed_by: UserId,
    ) -> Result<(), BoardError> {
        self.run(move |m| m.remove_member(&board_id, &target, &removed_by)).await
    }

    pub async fn update_member_role(
        &self,
        board_id: BoardId,
        target: UserId,
        new_role: Role,
        updated_by: UserId,
    ) -> Result<Member, BoardError> {
        self.run(move |m| m.update_member_role(&board_id, &target, new_role, &updated_by))
            .await
    }

    pub async fn leave_board(&self, board_id: BoardId, user_id: UserId) -> Result<(), BoardError> {
        self.run(move |m| m.leave_board(&board_id, &user_id)).await
    }

    pub async fn list_members(&self, board_id: BoardId, user_id: UserId) -> Result<Vec<MemberView>, BoardError> {
        self.run(move |m| m.list_members(&board_id, &user_id)).await
    }

    pub async fn create_invite_link(
        &self,
        board_id: BoardId,
        role: Option<Role>,
        created_by: UserId,
        options: InviteOptions,
    ) -> Result<InviteLink, BoardError> {
        self.run(move |m| m.create_invite_link(&board_id, role, &created_by, options))
            .await
    }

    pub async fn accept_invite_link(&self, token: String, user_id: UserId) -> Result<AcceptedInvite, BoardError> {
        self.run(move |m| m.accept_invite_link(&token, &user_id)).await
    }

    pub async fn list_invite_links(&self, board_id: BoardId, user_id: UserId) -> Result<Vec<InviteLink>, BoardError> {
        self.run(move |m| m.list_invite_links(&board_id, &user_id)).await
    }

    pub async fn revoke_invite_link(
        &self,
        board_id: BoardId,
        link_id: LinkId,
        revoked_by: UserId,
    ) -> Result<InviteLink, BoardError> {
        self.run(move |m| m.revoke_invite_link(&board_id, &link_id, &revoked_by))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_board::directory::InMemoryDirectory;
    use crate::core_board::storage::MemoryBoardStore;
    use crate::core_board::token::{InviteTokenSigner, DEFAULT_TOKEN_TTL};

    fn manager() -> AsyncBoardManager {
        AsyncBoardManager::new(BoardManagerImpl::new(
            Arc::new(MemoryBoardStore::new()),
            InviteTokenSigner::from_seed(&[5u8; 32], DEFAULT_TOKEN_TTL),
            Arc::new(InMemoryDirectory::new()),
        ))
    }

    #[tokio::test]
    async fn test_invite_flow() {
        let manager = manager();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        let board = manager
            .create_board(NewBoard::named("Async"), alice.clone())
            .await
            .unwrap();
        let link = manager
            .create_invite_link(board.id.clone(), Some(Role::Viewer), alice.clone(), InviteOptions::default())
            .await
            .unwrap();

        let accepted = manager.accept_invite_link(link.token, bob.clone()).await.unwrap();
        assert_eq!(accepted.board_id, board.id);
        assert_eq!(accepted.member.role, Role::Viewer);

        let access = manager.get_access(board.id.clone(), bob).await.unwrap();
        assert_eq!(access.role, Some(Role::Viewer));
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let manager = manager();
        let result = manager
            .get_board(BoardId::new("missing"), UserId::new("alice"))
            .await;
        assert!(matches!(result, Err(BoardError::BoardNotFound)));
    }
}

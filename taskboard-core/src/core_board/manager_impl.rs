//! Manager implementation backed by a [`BoardStore`]
//!
//! Mutations run as load, apply, conditional save. A save that loses the race
//! to a concurrent writer is retried against a fresh copy of the board, so
//! authorization and invariants are always checked on the state being
//! replaced. Nothing is cached between calls.

use super::access::{require, resolve_access, visible_to, AccessResult};
use super::board::{Board, BoardSettings, Member};
use super::directory::UserDirectory;
use super::errors::{BoardError, ErrorKind};
use super::invite::{create_invite_link, redeem_invite_link, revoke_invite_link, InviteLink, InviteOptions};
use super::manager::{AcceptedInvite, BoardManager, InviteManager, MemberView, MembershipManager, NewBoard};
use super::membership;
use super::permissions::{Action, Role};
use super::storage::{BoardStore, StoreError};
use super::token::InviteTokenSigner;
use super::types::{BoardId, LinkId, UserId};
use crate::config::InvitesConfig;
use crate::metrics::{self as board_metrics, record_counter, Timer};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Attempts per mutation when no configuration is supplied
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 5;

/// Transactional board service
pub struct BoardManagerImpl {
    store: Arc<dyn BoardStore>,
    signer: InviteTokenSigner,
    directory: Arc<dyn UserDirectory>,
    max_conflict_retries: u32,
}

impl BoardManagerImpl {
    pub fn new(
        store: Arc<dyn BoardStore>,
        signer: InviteTokenSigner,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            store,
            signer,
            directory,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }

    /// Build from the `[invites]` configuration section
    pub fn from_config(
        config: &InvitesConfig,
        store: Arc<dyn BoardStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Result<Self, BoardError> {
        let signer = match &config.signing_key {
            Some(seed) => InviteTokenSigner::from_hex_seed(seed, config.token_ttl)
                .map_err(BoardError::TokenIssue)?,
            None => {
                warn!("no invite signing key configured, tokens will not survive a restart");
                InviteTokenSigner::generate(config.token_ttl)
            }
        };

        Ok(Self::new(store, signer, directory).with_max_conflict_retries(config.max_conflict_retries))
    }

    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries.max(1);
        self
    }

    pub fn signer(&self) -> &InviteTokenSigner {
        &self.signer
    }

    fn load(&self, board_id: &BoardId) -> Result<Board, BoardError> {
        self.store
            .find_board_by_id(board_id)?
            .ok_or(BoardError::BoardNotFound)
    }

    /// Apply `op` to the latest board and save it conditionally.
    ///
    /// `op` may run several times and must only touch the board it is given.
    /// Returns its output together with the committed board. A board that
    /// `op` left unchanged is not saved and keeps its version.
    fn mutate<T, F>(&self, board_id: &BoardId, operation: &'static str, mut op: F) -> Result<(T, Board), BoardError>
    where
        F: FnMut(&mut Board) -> Result<T, BoardError>,
    {
        let timer = Timer::new(board_metrics::MUTATION_DURATION);

        for attempt in 1..=self.max_conflict_retries {
            let mut board = self.load(board_id)?;
            let before = board.clone();
            let output = op(&mut board)?;

            if board == before {
                debug!(board_id = %board_id, operation, "nothing changed, skipping save");
                timer.stop();
                return Ok((output, board));
            }

            match self.store.save_board(&board) {
                Ok(version) => {
                    board.version = version;
                    timer.stop();
                    return Ok((output, board));
                }
                Err(StoreError::VersionConflict { .. }) => {
                    record_counter(board_metrics::STORE_CONFLICTS, 1);
                    debug!(board_id = %board_id, operation, attempt, "save conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            board_id = %board_id,
            operation,
            attempts = self.max_conflict_retries,
            "giving up after repeated save conflicts"
        );
        Err(BoardError::Conflict)
    }

    fn enrich(&self, board: &Board) -> Vec<MemberView> {
        let mut views = Vec::with_capacity(board.members.len() + 1);
        views.push(MemberView::owner(board, self.directory.profile(&board.created_by)));
        views.extend(
            board
                .members
                .iter()
                .map(|m| MemberView::member(m, self.directory.profile(&m.user_id))),
        );
        views
    }
}

impl BoardManager for BoardManagerImpl {
    fn create_board(&self, new_board: NewBoard, created_by: &UserId) -> Result<Board, BoardError> {
        let mut board = Board::new(new_board.name, created_by.clone())?;
        board.description = new_board.description;
        board.is_public = new_board.is_public;

        self.store.insert_board(&board)?;

        info!(board_id = %board.id, created_by = %created_by, "board created");
        Ok(board)
    }

    fn get_board(&self, board_id: &BoardId, user_id: &UserId) -> Result<Board, BoardError> {
        let board = self.load(board_id)?;
        require(&board, user_id, Action::View)?;
        Ok(visible_to(board, user_id))
    }

    fn set_visibility(
        &self,
        board_id: &BoardId,
        is_public: bool,
        user_id: &UserId,
    ) -> Result<Board, BoardError> {
        let (_, board) = self.mutate(board_id, "set_visibility", |board| {
            require(board, user_id, Action::ManageMembers)?;
            if board.is_public != is_public {
                board.is_public = is_public;
                board.touch();
            }
            Ok(())
        })?;

        info!(board_id = %board_id, is_public, changed_by = %user_id, "board visibility set");
        Ok(visible_to(board, user_id))
    }

    fn update_settings(
        &self,
        board_id: &BoardId,
        settings: BoardSettings,
        user_id: &UserId,
    ) -> Result<BoardSettings, BoardError> {
        let (updated, _) = self.mutate(board_id, "update_settings", |board| {
            require(board, user_id, Action::ManageMembers)?;
            settings.default_role.ensure_assignable()?;
            board.settings = settings.clone();
            board.touch();
            Ok(board.settings.clone())
        })?;

        info!(board_id = %board_id, changed_by = %user_id, "board settings updated");
        Ok(updated)
    }

    fn get_access(&self, board_id: &BoardId, user_id: &UserId) -> Result<AccessResult, BoardError> {
        let board = self.load(board_id)?;
        Ok(resolve_access(&board, user_id))
    }

    fn list_shared_boards(&self, user_id: &UserId) -> Result<Vec<Board>, BoardError> {
        let boards = self.store.find_boards_for_user(user_id)?;
        Ok(boards.into_iter().map(|board| visible_to(board, user_id)).collect())
    }
}

impl MembershipManager for BoardManagerImpl {
    fn add_member(
        &self,
        board_id: &BoardId,
        target: &UserId,
        role: Role,
        invited_by: &UserId,
    ) -> Result<Member, BoardError> {
        let (member, _) = self.mutate(board_id, "add_member", |board| {
            membership::add_member(board, target, role, invited_by)
        })?;

        record_counter(board_metrics::MEMBERS_ADDED, 1);
        info!(board_id = %board_id, user_id = %target, role = %role, invited_by = %invited_by, "member added");
        Ok(member)
    }

    fn remove_member(
        &self,
        board_id: &BoardId,
        target: &UserId,
        removed_by: &UserId,
    ) -> Result<(), BoardError> {
        self.mutate(board_id, "remove_member", |board| {
            membership::remove_member(board, target, removed_by)
        })?;

        record_counter(board_metrics::MEMBERS_REMOVED, 1);
        info!(board_id = %board_id, user_id = %target, removed_by = %removed_by, "member removed");
        Ok(())
    }

    fn update_member_role(
        &self,
        board_id: &BoardId,
        target: &UserId,
        new_role: Role,
        updated_by: &UserId,
    ) -> Result<Member, BoardError> {
        let (member, _) = self.mutate(board_id, "update_member_role", |board| {
            membership::update_member_role(board, target, new_role, updated_by)
        })?;

        record_counter(board_metrics::MEMBERS_ROLE_UPDATED, 1);
        info!(board_id = %board_id, user_id = %target, role = %new_role, updated_by = %updated_by, "member role updated");
        Ok(member)
    }

    fn leave_board(&self, board_id: &BoardId, user_id: &UserId) -> Result<(), BoardError> {
        self.mutate(board_id, "leave_board", |board| membership::leave_board(board, user_id))?;

        record_counter(board_metrics::MEMBERS_REMOVED, 1);
        info!(board_id = %board_id, user_id = %user_id, "member left board");
        Ok(())
    }

    fn list_members(&self, board_id: &BoardId, user_id: &UserId) -> Result<Vec<MemberView>, BoardError> {
        let board = self.load(board_id)?;
        require(&board, user_id, Action::View)?;
        Ok(self.enrich(&board))
    }
}

impl InviteManager for BoardManagerImpl {
    fn create_invite_link(
        &self,
        board_id: &BoardId,
        role: Option<Role>,
        created_by: &UserId,
        options: InviteOptions,
    ) -> Result<InviteLink, BoardError> {
        let (link, _) = self.mutate(board_id, "create_invite_link", |board| {
            let role = role.unwrap_or(board.settings.default_role);
            create_invite_link(board, &self.signer, role, created_by, &options)
        })?;

        record_counter(board_metrics::INVITES_CREATED, 1);
        info!(
            board_id = %board_id,
            link_id = %link.id,
            role = %link.role,
            max_uses = ?link.max_uses,
            created_by = %created_by,
            "invite link created"
        );
        Ok(link)
    }

    fn accept_invite_link(&self, token: &str, user_id: &UserId) -> Result<AcceptedInvite, BoardError> {
        let claims = self.signer.verify(token).map_err(|e| {
            record_counter(board_metrics::INVITES_REJECTED, 1);
            warn!(user_id = %user_id, error = %e, "invite token rejected");
            BoardError::InvalidToken
        })?;

        let result = self.mutate(&claims.board_id, "accept_invite_link", |board| {
            redeem_invite_link(board, token, user_id)
        });

        match result {
            Ok((member, _)) => {
                record_counter(board_metrics::INVITES_ACCEPTED, 1);
                info!(board_id = %claims.board_id, user_id = %user_id, role = %member.role, "invite accepted");
                Ok(AcceptedInvite {
                    board_id: claims.board_id,
                    member,
                })
            }
            Err(e) => {
                if matches!(e.kind(), ErrorKind::Validation | ErrorKind::NotFound) {
                    record_counter(board_metrics::INVITES_REJECTED, 1);
                    warn!(board_id = %claims.board_id, user_id = %user_id, error = %e, "invite redemption refused");
                }
                Err(e)
            }
        }
    }

    fn list_invite_links(&self, board_id: &BoardId, user_id: &UserId) -> Result<Vec<InviteLink>, BoardError> {
        let board = self.load(board_id)?;
        require(&board, user_id, Action::Invite)?;
        Ok(board.invite_links)
    }

    fn revoke_invite_link(
        &self,
        board_id: &BoardId,
        link_id: &LinkId,
        revoked_by: &UserId,
    ) -> Result<InviteLink, BoardError> {
        let ((link, changed), _) = self.mutate(board_id, "revoke_invite_link", |board| {
            revoke_invite_link(board, link_id, revoked_by)
        })?;

        if changed {
            record_counter(board_metrics::INVITES_REVOKED, 1);
            info!(board_id = %board_id, link_id = %link_id, revoked_by = %revoked_by, "invite link revoked");
        } else {
            debug!(board_id = %board_id, link_id = %link_id, "invite link already revoked");
        }
        Ok(link)
    }
}

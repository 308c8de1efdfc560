//! Manager traits for board sharing operations
//!
//! Every operation names the acting user explicitly and re-derives that user's
//! access from freshly loaded board state.

use super::access::AccessResult;
use super::board::{Board, BoardSettings, Member};
use super::directory::UserProfile;
use super::errors::BoardError;
use super::invite::{InviteLink, InviteOptions};
use super::permissions::{PermissionSet, Role};
use super::types::{BoardId, LinkId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Input for [`BoardManager::create_board`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl NewBoard {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One row of a member listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub user_id: UserId,
    pub role: Role,
    pub permissions: PermissionSet,
    /// None for the owner
    pub invited_by: Option<UserId>,
    pub invited_at: Option<Timestamp>,
    pub joined_at: Option<Timestamp>,
    /// None when the directory has no profile for the user
    pub profile: Option<UserProfile>,
}

impl MemberView {
    pub(crate) fn owner(board: &Board, profile: Option<UserProfile>) -> Self {
        Self {
            user_id: board.created_by.clone(),
            role: Role::Owner,
            permissions: Role::Owner.permissions(),
            invited_by: None,
            invited_at: None,
            joined_at: Some(board.created_at),
            profile,
        }
    }

    pub(crate) fn member(member: &Member, profile: Option<UserProfile>) -> Self {
        Self {
            user_id: member.user_id.clone(),
            role: member.role,
            permissions: member.permissions(),
            invited_by: Some(member.invited_by.clone()),
            invited_at: Some(member.invited_at),
            joined_at: member.joined_at,
            profile,
        }
    }
}

/// Result of a successful invite redemption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedInvite {
    pub board_id: BoardId,
    pub member: Member,
}

/// Board lifecycle and visibility
pub trait BoardManager {
    /// Create a board owned by `created_by`
    fn create_board(&self, new_board: NewBoard, created_by: &UserId) -> Result<Board, BoardError>;

    /// Fetch a board the user can view
    fn get_board(&self, board_id: &BoardId, user_id: &UserId) -> Result<Board, BoardError>;

    /// Make a board public or private (requires canManageMembers)
    fn set_visibility(
        &self,
        board_id: &BoardId,
        is_public: bool,
        user_id: &UserId,
    ) -> Result<Board, BoardError>;

    /// Replace sharing defaults (requires canManageMembers)
    fn update_settings(
        &self,
        board_id: &BoardId,
        settings: BoardSettings,
        user_id: &UserId,
    ) -> Result<BoardSettings, BoardError>;

    /// The caller's own access to a board. Never fails for lack of access.
    fn get_access(&self, board_id: &BoardId, user_id: &UserId) -> Result<AccessResult, BoardError>;

    /// Boards the user owns or is a member of
    fn list_shared_boards(&self, user_id: &UserId) -> Result<Vec<Board>, BoardError>;
}

/// Board membership operations
pub trait MembershipManager {
    /// Add a member, or change the role of an existing one
    fn add_member(
        &self,
        board_id: &BoardId,
        target: &UserId,
        role: Role,
        invited_by: &UserId,
    ) -> Result<Member, BoardError>;

    /// Remove another member
    fn remove_member(
        &self,
        board_id: &BoardId,
        target: &UserId,
        removed_by: &UserId,
    ) -> Result<(), BoardError>;

    /// Change a member's role
    fn update_member_role(
        &self,
        board_id: &BoardId,
        target: &UserId,
        new_role: Role,
        updated_by: &UserId,
    ) -> Result<Member, BoardError>;

    /// Give up one's own membership
    fn leave_board(&self, board_id: &BoardId, user_id: &UserId) -> Result<(), BoardError>;

    /// Owner first, then members in join order
    fn list_members(&self, board_id: &BoardId, user_id: &UserId) -> Result<Vec<MemberView>, BoardError>;
}

/// Invite link operations
pub trait InviteManager {
    /// Issue a link. `role` defaults to the board's configured default role.
    fn create_invite_link(
        &self,
        board_id: &BoardId,
        role: Option<Role>,
        created_by: &UserId,
        options: InviteOptions,
    ) -> Result<InviteLink, BoardError>;

    /// Redeem a token for membership
    fn accept_invite_link(&self, token: &str, user_id: &UserId) -> Result<AcceptedInvite, BoardError>;

    /// All links of a board, revoked ones included (requires canInvite)
    fn list_invite_links(&self, board_id: &BoardId, user_id: &UserId) -> Result<Vec<InviteLink>, BoardError>;

    /// Deactivate a link permanently
    fn revoke_invite_link(
        &self,
        board_id: &BoardId,
        link_id: &LinkId,
        revoked_by: &UserId,
    ) -> Result<InviteLink, BoardError>;
}

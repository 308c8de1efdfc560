//! Access resolution
//!
//! Resolution order, first match wins:
//! 1. the board owner gets the full set under the `Owner` role
//! 2. a member record yields that member's role
//! 3. a public board yields `Viewer` without creating a member record
//! 4. everyone else gets no access
//!
//! Everything here is read-only. Mutating operations call [`require`] against
//! the board they are about to change, never a previously resolved result.

use super::board::{Board, Member};
use super::errors::BoardError;
use super::permissions::{permissions_for_role, Action, PermissionSet, Role};
use super::types::UserId;
use serde::{Deserialize, Serialize};

/// Outcome of resolving a user's access to a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResult {
    pub has_access: bool,
    pub role: Option<Role>,
    pub permissions: PermissionSet,
    pub member: Option<Member>,
}

impl AccessResult {
    fn denied() -> Self {
        Self {
            has_access: false,
            role: None,
            permissions: PermissionSet::NONE,
            member: None,
        }
    }

    fn granted(role: Role, member: Option<Member>) -> Self {
        Self {
            has_access: true,
            role: Some(role),
            permissions: permissions_for_role(Some(role)),
            member,
        }
    }
}

/// Compute what `user_id` may do on `board`
pub fn resolve_access(board: &Board, user_id: &UserId) -> AccessResult {
    if board.is_owner(user_id) {
        return AccessResult::granted(Role::Owner, None);
    }

    if let Some(member) = board.member(user_id) {
        return AccessResult::granted(member.role, Some(member.clone()));
    }

    if board.is_public {
        return AccessResult::granted(Role::Viewer, None);
    }

    AccessResult::denied()
}

/// Whether `user_id` holds the capability for `action`
pub fn can_perform(board: &Board, user_id: &UserId, action: Action) -> bool {
    resolve_access(board, user_id).permissions.allows(action)
}

/// Fail with `Unauthorized` unless `user_id` may perform `action`
pub fn require(board: &Board, user_id: &UserId, action: Action) -> Result<(), BoardError> {
    if can_perform(board, user_id, action) {
        Ok(())
    } else {
        tracing::debug!(
            board_id = %board.id,
            user_id = %user_id,
            action = %action,
            "access denied"
        );
        Err(BoardError::Unauthorized)
    }
}

/// The board as `user_id` may see it.
///
/// Invite links carry redeemable tokens, so they are only shown to users
/// who may invite. Stored boards are never redacted.
pub fn visible_to(mut board: Board, user_id: &UserId) -> Board {
    if !can_perform(&board, user_id, Action::Invite) {
        board.invite_links.clear();
    }
    board
}

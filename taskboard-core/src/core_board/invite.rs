//! Board invite links

use super::access::require;
use super::board::{Board, Member};
use super::errors::BoardError;
use super::permissions::{Action, Role};
use super::token::InviteTokenSigner;
use super::types::{LinkId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// Board invitation link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteLink {
    /// Unique identifier
    pub id: LinkId,

    /// Signed token handed to invitees
    pub token: String,

    /// Role granted on redemption
    pub role: Role,

    /// Who created the link
    pub created_by: UserId,

    /// When the link was created
    pub created_at: Timestamp,

    /// Optional expiration time, checked on redemption
    pub expires_at: Option<Timestamp>,

    /// Maximum number of uses (None = unlimited)
    pub max_uses: Option<u32>,

    /// Successful redemptions so far
    pub used_count: u32,

    /// False once revoked. Never set back to true.
    pub is_active: bool,
}

impl InviteLink {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        matches!(self.expires_at, Some(expires_at) if now > expires_at)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.max_uses, Some(max_uses) if self.used_count >= max_uses)
    }

    /// Check the link can grant membership right now
    pub fn check_redeemable(&self, now: Timestamp) -> Result<(), BoardError> {
        if !self.is_active {
            return Err(BoardError::InvalidToken);
        }
        if self.is_expired_at(now) {
            return Err(BoardError::LinkExpired);
        }
        if self.is_exhausted() {
            return Err(BoardError::LinkExhausted);
        }
        Ok(())
    }
}

/// Optional limits for a new link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteOptions {
    pub expires_at: Option<Timestamp>,
    pub max_uses: Option<u32>,
}

impl InviteOptions {
    fn validate(&self, now: Timestamp) -> Result<(), BoardError> {
        if self.max_uses == Some(0) {
            return Err(BoardError::InvalidInput("max_uses must be at least 1".to_string()));
        }
        if matches!(self.expires_at, Some(expires_at) if expires_at <= now) {
            return Err(BoardError::InvalidInput(
                "expires_at must be in the future".to_string(),
            ));
        }
        Ok(())
    }
}

/// Issue a new link granting `role`, appended to the board
pub fn create_invite_link(
    board: &mut Board,
    signer: &InviteTokenSigner,
    role: Role,
    created_by: &UserId,
    options: &InviteOptions,
) -> Result<InviteLink, BoardError> {
    require(board, created_by, Action::Invite)?;
    let role = role.ensure_assignable()?;

    let now = Timestamp::now();
    options.validate(now)?;

    let token = signer
        .issue(&board.id, role, created_by)
        .map_err(BoardError::TokenIssue)?;

    let link = InviteLink {
        id: LinkId::generate(),
        token,
        role,
        created_by: created_by.clone(),
        created_at: now,
        expires_at: options.expires_at,
        max_uses: options.max_uses,
        used_count: 0,
        is_active: true,
    };
    board.invite_links.push(link.clone());
    board.touch();
    Ok(link)
}

/// Consume one use of the link matching `token` and add `user_id` as member.
///
/// The token signature must already have been verified. The membership and
/// the use count change together on the same board value.
pub fn redeem_invite_link(
    board: &mut Board,
    token: &str,
    user_id: &UserId,
) -> Result<Member, BoardError> {
    let now = Timestamp::now();
    let already_member = board.is_member(user_id);

    let link = board
        .link_by_token_mut(token)
        .ok_or(BoardError::InvalidToken)?;
    link.check_redeemable(now)?;

    if already_member {
        return Err(BoardError::AlreadyMember);
    }

    link.used_count += 1;
    let member = Member {
        user_id: user_id.clone(),
        role: link.role,
        invited_by: link.created_by.clone(),
        invited_at: now,
        joined_at: Some(now),
    };

    board.members.push(member.clone());
    board.touch();
    Ok(member)
}

/// Deactivate a link. Revoking an inactive link changes nothing.
///
/// Returns the link and whether this call deactivated it.
pub fn revoke_invite_link(
    board: &mut Board,
    link_id: &LinkId,
    revoked_by: &UserId,
) -> Result<(InviteLink, bool), BoardError> {
    require(board, revoked_by, Action::Invite)?;

    let link = board.link_mut(link_id).ok_or(BoardError::LinkNotFound)?;
    if !link.is_active {
        return Ok((link.clone(), false));
    }

    link.is_active = false;
    let revoked = link.clone();
    board.touch();
    Ok((revoked, true))
}

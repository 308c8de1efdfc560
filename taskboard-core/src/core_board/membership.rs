//! Membership rules
//!
//! Each function authorizes the actor against the board it is handed, checks
//! invariants, then mutates the board in place. Persisting is the caller's job
//! and must be a conditional save of the same board value.

use super::access::require;
use super::board::{Board, Member};
use super::errors::BoardError;
use super::permissions::{Action, Role};
use super::types::{Timestamp, UserId};

/// Add `target` with `role`, or replace the role of an existing member.
///
/// Re-adding an existing member keeps its original `invited_by`/`invited_at`.
pub fn add_member(
    board: &mut Board,
    target: &UserId,
    role: Role,
    invited_by: &UserId,
) -> Result<Member, BoardError> {
    require(board, invited_by, Action::Invite)?;
    let role = role.ensure_assignable()?;

    if board.is_owner(target) {
        return Err(BoardError::CannotModifyOwner);
    }

    if let Some(existing) = board.member_mut(target) {
        existing.role = role;
        let updated = existing.clone();
        board.touch();
        return Ok(updated);
    }

    let now = Timestamp::now();
    let member = Member {
        user_id: target.clone(),
        role,
        invited_by: invited_by.clone(),
        invited_at: now,
        joined_at: Some(now),
    };
    board.members.push(member.clone());
    board.touch();
    Ok(member)
}

/// Remove another member.
///
/// Checks run in a fixed order: permission, owner, self, existence.
pub fn remove_member(
    board: &mut Board,
    target: &UserId,
    removed_by: &UserId,
) -> Result<Member, BoardError> {
    require(board, removed_by, Action::ManageMembers)?;

    if board.is_owner(target) {
        return Err(BoardError::CannotRemoveOwner);
    }
    if target == removed_by {
        return Err(BoardError::CannotRemoveSelf);
    }

    take_member(board, target)
}

/// Change a member's role. The owner can never be changed.
pub fn update_member_role(
    board: &mut Board,
    target: &UserId,
    new_role: Role,
    updated_by: &UserId,
) -> Result<Member, BoardError> {
    require(board, updated_by, Action::ManageMembers)?;

    if board.is_owner(target) {
        return Err(BoardError::CannotModifyOwner);
    }
    let new_role = new_role.ensure_assignable()?;

    let member = board.member_mut(target).ok_or(BoardError::MemberNotFound)?;
    member.role = new_role;
    let updated = member.clone();
    board.touch();
    Ok(updated)
}

/// Self-removal. The owner cannot leave their own board.
pub fn leave_board(board: &mut Board, user_id: &UserId) -> Result<Member, BoardError> {
    if board.is_owner(user_id) {
        return Err(BoardError::CannotRemoveOwner);
    }
    take_member(board, user_id)
}

fn take_member(board: &mut Board, user_id: &UserId) -> Result<Member, BoardError> {
    let pos = board
        .members
        .iter()
        .position(|m| &m.user_id == user_id)
        .ok_or(BoardError::MemberNotFound)?;
    let removed = board.members.remove(pos);
    board.touch();
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_board::access::resolve_access;
    use crate::core_board::permissions::PermissionSet;

    fn setup() -> (Board, UserId) {
        let owner = UserId::new("alice");
        let board = Board::new("Test Board".to_string(), owner.clone()).unwrap();
        (board, owner)
    }

    #[test]
    fn test_add_member() {
        let (mut board, owner) = setup();
        let bob = UserId::new("bob");

        let member = add_member(&mut board, &bob, Role::Editor, &owner).unwrap();

        assert_eq!(member.role, Role::Editor);
        assert_eq!(member.invited_by, owner);
        assert_eq!(member.joined_at, Some(member.invited_at));
        assert_eq!(board.members.len(), 1);
        assert_eq!(resolve_access(&board, &bob).permissions, PermissionSet::EDITOR);
    }

    #[test]
    fn test_add_existing_member_upserts_role() {
        let (mut board, owner) = setup();
        let bob = UserId::new("bob");
        let first = add_member(&mut board, &bob, Role::Viewer, &owner).unwrap();

        let second = add_member(&mut board, &bob, Role::Admin, &owner).unwrap();

        assert_eq!(board.members.len(), 1);
        assert_eq!(second.role, Role::Admin);
        assert_eq!(second.invited_at, first.invited_at);
        assert_eq!(board.member(&bob).unwrap().permissions(), PermissionSet::FULL);
    }

    #[test]
    fn test_add_requires_invite_permission() {
        let (mut board, owner) = setup();
        let editor = UserId::new("bob");
        add_member(&mut board, &editor, Role::Editor, &owner).unwrap();

        let result = add_member(&mut board, &UserId::new("carol"), Role::Viewer, &editor);
        assert!(matches!(result, Err(BoardError::Unauthorized)));
        assert_eq!(board.members.len(), 1);
    }

    #[test]
    fn test_owner_role_is_not_assignable() {
        let (mut board, owner) = setup();
        let result = add_member(&mut board, &UserId::new("bob"), Role::Owner, &owner);
        assert!(matches!(result, Err(BoardError::InvalidRole(_))));
    }

    #[test]
    fn test_cannot_add_owner_as_member() {
        let (mut board, owner) = setup();
        let result = add_member(&mut board, &owner, Role::Viewer, &owner);
        assert!(matches!(result, Err(BoardError::CannotModifyOwner)));
        assert!(board.members.is_empty());
    }

    #[test]
    fn test_add_then_remove_restores_members() {
        let (mut board, owner) = setup();
        add_member(&mut board, &UserId::new("bob"), Role::Editor, &owner).unwrap();
        let before = board.members.clone();

        let carol = UserId::new("carol");
        add_member(&mut board, &carol, Role::Viewer, &owner).unwrap();
        remove_member(&mut board, &carol, &owner).unwrap();

        assert_eq!(board.members, before);
    }

    #[test]
    fn test_remove_check_order() {
        let (mut board, owner) = setup();

        // owner removing themselves hits the owner check first
        assert!(matches!(
            remove_member(&mut board, &owner, &owner),
            Err(BoardError::CannotRemoveOwner)
        ));

        let admin = UserId::new("bob");
        add_member(&mut board, &admin, Role::Admin, &owner).unwrap();
        assert!(matches!(
            remove_member(&mut board, &admin, &admin),
            Err(BoardError::CannotRemoveSelf)
        ));
        assert!(matches!(
            remove_member(&mut board, &owner, &admin),
            Err(BoardError::CannotRemoveOwner)
        ));
        assert!(matches!(
            remove_member(&mut board, &UserId::new("ghost"), &admin),
            Err(BoardError::MemberNotFound)
        ));
    }

    #[test]
    fn test_remove_requires_manage_members() {
        let (mut board, owner) = setup();
        let editor = UserId::new("bob");
        let viewer = UserId::new("carol");
        add_member(&mut board, &editor, Role::Editor, &owner).unwrap();
        add_member(&mut board, &viewer, Role::Viewer, &owner).unwrap();

        assert!(matches!(
            remove_member(&mut board, &viewer, &editor),
            Err(BoardError::Unauthorized)
        ));
        assert_eq!(board.members.len(), 2);
    }

    #[test]
    fn test_update_member_role() {
        let (mut board, owner) = setup();
        let bob = UserId::new("bob");
        add_member(&mut board, &bob, Role::Editor, &owner).unwrap();

        let updated = update_member_role(&mut board, &bob, Role::Viewer, &owner).unwrap();

        assert_eq!(updated.role, Role::Viewer);
        assert_eq!(resolve_access(&board, &bob).permissions, PermissionSet::VIEWER);
    }

    #[test]
    fn test_update_owner_role_always_fails() {
        let (mut board, owner) = setup();
        let admin = UserId::new("bob");
        add_member(&mut board, &admin, Role::Admin, &owner).unwrap();

        for role in [Role::Owner, Role::Admin, Role::Editor, Role::Viewer] {
            assert!(matches!(
                update_member_role(&mut board, &owner, role, &admin),
                Err(BoardError::CannotModifyOwner)
            ));
        }
        assert_eq!(resolve_access(&board, &owner).role, Some(Role::Owner));
    }

    #[test]
    fn test_update_validates_role_and_existence() {
        let (mut board, owner) = setup();
        let bob = UserId::new("bob");
        add_member(&mut board, &bob, Role::Editor, &owner).unwrap();

        assert!(matches!(
            update_member_role(&mut board, &bob, Role::Owner, &owner),
            Err(BoardError::InvalidRole(_))
        ));
        assert!(matches!(
            update_member_role(&mut board, &UserId::new("ghost"), Role::Viewer, &owner),
            Err(BoardError::MemberNotFound)
        ));
    }

    #[test]
    fn test_leave_board() {
        let (mut board, owner) = setup();
        let bob = UserId::new("bob");
        add_member(&mut board, &bob, Role::Viewer, &owner).unwrap();

        leave_board(&mut board, &bob).unwrap();
        assert!(board.members.is_empty());
        assert!(matches!(leave_board(&mut board, &bob), Err(BoardError::MemberNotFound)));
        assert!(matches!(
            leave_board(&mut board, &owner),
            Err(BoardError::CannotRemoveOwner)
        ));
    }
}

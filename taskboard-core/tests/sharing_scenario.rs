//! End-to-end sharing scenarios through the board manager
//!
//! Covers:
//! - invite link issue, redemption and exhaustion
//! - role changes and removal order of checks
//! - owner immutability
//! - revocation and application-level expiry

use std::time::Duration;
use taskboard_core::core_board::{
    BoardError, BoardManager, BoardStore, InviteManager, InviteOptions, MembershipManager, NewBoard,
    PermissionSet, Role, Timestamp,
};
use taskboard_core::test_utils::{test_manager, user};

#[test]
fn test_invite_scenario() {
    println!("\n=== Testing: editor invite with two uses ===\n");

    let (manager, _store) = test_manager();
    let (a, c, d, e) = (user("A"), user("C"), user("D"), user("E"));

    let board = manager.create_board(NewBoard::named("B"), &a).unwrap();
    assert!(!board.is_public);

    let link = manager
        .create_invite_link(
            &board.id,
            Some(Role::Editor),
            &a,
            InviteOptions {
                expires_at: None,
                max_uses: Some(2),
            },
        )
        .unwrap();
    println!("✓ Link created");

    let joined = manager.accept_invite_link(&link.token, &c).unwrap();
    assert_eq!(joined.member.role, Role::Editor);
    let links = manager.list_invite_links(&board.id, &a).unwrap();
    assert_eq!(links[0].used_count, 1);

    manager.accept_invite_link(&link.token, &d).unwrap();
    let links = manager.list_invite_links(&board.id, &a).unwrap();
    assert_eq!(links[0].used_count, 2);
    println!("✓ C and D joined as editors");

    assert!(matches!(
        manager.accept_invite_link(&link.token, &e),
        Err(BoardError::LinkExhausted)
    ));
    println!("✓ E rejected, link exhausted");

    let updated = manager.update_member_role(&board.id, &c, Role::Viewer, &a).unwrap();
    assert_eq!(updated.role, Role::Viewer);
    let access = manager.get_access(&board.id, &c).unwrap();
    assert_eq!(access.permissions, PermissionSet::VIEWER);
    println!("✓ C demoted to viewer");

    assert!(matches!(
        manager.remove_member(&board.id, &a, &a),
        Err(BoardError::CannotRemoveOwner)
    ));
    println!("✓ Owner cannot be removed");

    let members = manager.list_members(&board.id, &a).unwrap();
    let ids: Vec<_> = members.iter().map(|m| m.user_id.clone()).collect();
    assert_eq!(ids, vec![a, c, d]);
}

#[test]
fn test_owner_role_never_changes() {
    let (manager, _store) = test_manager();
    let alice = user("alice");
    let bob = user("bob");
    let board = manager.create_board(NewBoard::named("Plans"), &alice).unwrap();
    manager.add_member(&board.id, &bob, Role::Admin, &alice).unwrap();

    for role in [Role::Admin, Role::Editor, Role::Viewer] {
        assert!(matches!(
            manager.update_member_role(&board.id, &alice, role, &alice),
            Err(BoardError::CannotModifyOwner)
        ));
        assert!(matches!(
            manager.update_member_role(&board.id, &alice, role, &bob),
            Err(BoardError::CannotModifyOwner)
        ));
    }

    let access = manager.get_access(&board.id, &alice).unwrap();
    assert_eq!(access.role, Some(Role::Owner));
    assert_eq!(access.permissions, PermissionSet::FULL);
}

#[test]
fn test_admin_manages_but_cannot_touch_owner() {
    let (manager, _store) = test_manager();
    let alice = user("alice");
    let bob = user("bob");
    let carol = user("carol");
    let board = manager.create_board(NewBoard::named("Plans"), &alice).unwrap();

    manager.add_member(&board.id, &bob, Role::Admin, &alice).unwrap();
    manager.add_member(&board.id, &carol, Role::Editor, &bob).unwrap();
    manager.update_member_role(&board.id, &carol, Role::Viewer, &bob).unwrap();

    assert!(matches!(
        manager.remove_member(&board.id, &alice, &bob),
        Err(BoardError::CannotRemoveOwner)
    ));
    assert!(matches!(
        manager.remove_member(&board.id, &bob, &bob),
        Err(BoardError::CannotRemoveSelf)
    ));

    manager.remove_member(&board.id, &carol, &bob).unwrap();
    assert!(matches!(
        manager.remove_member(&board.id, &carol, &bob),
        Err(BoardError::MemberNotFound)
    ));

    // Viewer may not invite
    manager.add_member(&board.id, &carol, Role::Viewer, &alice).unwrap();
    assert!(matches!(
        manager.create_invite_link(&board.id, None, &carol, InviteOptions::default()),
        Err(BoardError::Unauthorized)
    ));
}

#[test]
fn test_public_board_does_not_create_members() {
    let (manager, _store) = test_manager();
    let alice = user("alice");
    let visitor = user("visitor");
    let board = manager.create_board(NewBoard::named("Open"), &alice).unwrap();

    assert!(!manager.get_access(&board.id, &visitor).unwrap().has_access);
    manager.set_visibility(&board.id, true, &alice).unwrap();

    let access = manager.get_access(&board.id, &visitor).unwrap();
    assert!(access.has_access);
    assert_eq!(access.role, Some(Role::Viewer));
    assert!(manager.get_board(&board.id, &visitor).unwrap().members.is_empty());
    assert!(matches!(
        manager.add_member(&board.id, &user("friend"), Role::Viewer, &visitor),
        Err(BoardError::Unauthorized)
    ));
}

#[test]
fn test_public_board_reader_cannot_take_admin_link() {
    let (manager, _store) = test_manager();
    let alice = user("alice");
    let mallory = user("mallory");
    let board = manager.create_board(NewBoard::named("Open"), &alice).unwrap();
    manager.set_visibility(&board.id, true, &alice).unwrap();
    manager
        .create_invite_link(&board.id, Some(Role::Admin), &alice, InviteOptions::default())
        .unwrap();

    assert!(matches!(
        manager.list_invite_links(&board.id, &mallory),
        Err(BoardError::Unauthorized)
    ));

    let seen = manager.get_board(&board.id, &mallory).unwrap();
    assert!(seen.invite_links.is_empty());

    let access = manager.get_access(&board.id, &mallory).unwrap();
    assert_eq!(access.role, Some(Role::Viewer));
    assert!(access.member.is_none());
}

#[test]
fn test_revoked_link_stays_revoked() {
    let (manager, _store) = test_manager();
    let alice = user("alice");
    let board = manager.create_board(NewBoard::named("Plans"), &alice).unwrap();
    let link = manager
        .create_invite_link(&board.id, Some(Role::Viewer), &alice, InviteOptions::default())
        .unwrap();

    manager.revoke_invite_link(&board.id, &link.id, &alice).unwrap();
    let again = manager.revoke_invite_link(&board.id, &link.id, &alice).unwrap();
    assert!(!again.is_active);
    assert_eq!(again.used_count, 0);

    assert!(matches!(
        manager.accept_invite_link(&link.token, &user("bob")),
        Err(BoardError::InvalidToken)
    ));
}

#[test]
fn test_link_expiry_checked_on_redemption() {
    let (manager, store) = test_manager();
    let alice = user("alice");
    let board = manager.create_board(NewBoard::named("Plans"), &alice).unwrap();
    let link = manager
        .create_invite_link(
            &board.id,
            Some(Role::Editor),
            &alice,
            InviteOptions {
                expires_at: Some(Timestamp::now().plus(Duration::from_secs(60))),
                max_uses: None,
            },
        )
        .unwrap();

    // Age the link past its expiry directly in the store
    let mut stored = store.find_board_by_id(&board.id).unwrap().unwrap();
    stored.link_mut(&link.id).unwrap().expires_at = Some(Timestamp::now().minus(Duration::from_secs(1)));
    store.save_board(&stored).unwrap();

    assert!(matches!(
        manager.accept_invite_link(&link.token, &user("bob")),
        Err(BoardError::LinkExpired)
    ));
}

#[test]
fn test_add_then_remove_restores_members() {
    let (manager, _store) = test_manager();
    let alice = user("alice");
    let board = manager.create_board(NewBoard::named("Plans"), &alice).unwrap();
    manager.add_member(&board.id, &user("bob"), Role::Editor, &alice).unwrap();
    let before = manager.get_board(&board.id, &alice).unwrap().members;

    manager.add_member(&board.id, &user("carol"), Role::Viewer, &alice).unwrap();
    manager.remove_member(&board.id, &user("carol"), &alice).unwrap();

    assert_eq!(manager.get_board(&board.id, &alice).unwrap().members, before);
}

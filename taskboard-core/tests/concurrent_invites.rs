//! Concurrent redemption and membership changes against one board
//!
//! Threads start together behind a barrier so their load-modify-save cycles
//! overlap. The conditional save must let exactly one winner through for a
//! single-use link and must never lose a member update.

use std::sync::{Arc, Barrier};
use std::thread;
use taskboard_core::core_board::{
    BoardError, BoardManager, BoardManagerImpl, BoardSqlStore, BoardStore, InviteManager, InviteOptions,
    MembershipManager, NewBoard, Role,
};
use taskboard_core::test_utils::{manager_over, test_manager, user};

fn race_single_use_link(manager: &BoardManagerImpl) {
    let owner = user("owner");
    let board = manager.create_board(NewBoard::named("Race"), &owner).unwrap();
    let link = manager
        .create_invite_link(
            &board.id,
            Some(Role::Editor),
            &owner,
            InviteOptions {
                expires_at: None,
                max_uses: Some(1),
            },
        )
        .unwrap();

    let barrier = Barrier::new(2);
    let results: Vec<Result<_, BoardError>> = thread::scope(|s| {
        let handles: Vec<_> = ["bob", "carol"]
            .into_iter()
            .map(|name| {
                let barrier = &barrier;
                let token = link.token.as_str();
                s.spawn(move || {
                    barrier.wait();
                    manager.accept_invite_link(token, &user(name))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one redemption must win: {results:?}");
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(BoardError::LinkExhausted))));

    let stored = manager.get_board(&board.id, &owner).unwrap();
    assert_eq!(stored.members.len(), 1);
    assert_eq!(stored.link(&link.id).unwrap().used_count, 1);
}

#[test]
fn test_single_use_link_memory_store() {
    for _ in 0..20 {
        let (manager, _store) = test_manager();
        race_single_use_link(&manager);
    }
}

#[test]
fn test_single_use_link_sql_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = taskboard_core::config::StoreConfig {
        database_path: dir.path().join("race.db"),
        pool_size: 4,
        ..Default::default()
    };
    let store: Arc<dyn BoardStore> = Arc::new(BoardSqlStore::open(&config).unwrap());
    let manager = manager_over(store);

    for _ in 0..5 {
        race_single_use_link(&manager);
    }
}

#[test]
fn test_concurrent_adds_are_not_lost() {
    let (manager, _store) = test_manager();
    let manager = manager.with_max_conflict_retries(64);
    let owner = user("owner");
    let board = manager.create_board(NewBoard::named("Busy"), &owner).unwrap();

    let names: Vec<String> = (0..8).map(|i| format!("user-{i}")).collect();
    let barrier = Barrier::new(names.len());

    thread::scope(|s| {
        for name in &names {
            let barrier = &barrier;
            let manager = &manager;
            let owner = &owner;
            let board_id = &board.id;
            s.spawn(move || {
                barrier.wait();
                manager
                    .add_member(board_id, &user(name), Role::Viewer, owner)
                    .unwrap();
            });
        }
    });

    let stored = manager.get_board(&board.id, &owner).unwrap();
    assert_eq!(stored.members.len(), names.len());
    assert_eq!(stored.version, names.len() as u64);
}

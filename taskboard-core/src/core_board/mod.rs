//! Board sharing engine
//!
//! Decides who may view, edit, delete, invite or manage members on a board,
//! and applies membership and invite link changes.
//!
//! ## Layout
//!
//! - **permissions**: role to capability set, no state
//! - **access**: owner, then member record, then public fallback
//! - **membership** / **invite**: pure operations on a loaded [`Board`]
//! - **manager_impl**: load, apply, conditional save with bounded retry
//!
//! A board is the unit of consistency. Operations on different boards never
//! coordinate.

pub mod access;
pub mod async_manager;
pub mod board;
pub mod directory;
pub mod errors;
pub mod invite;
pub mod manager;
pub mod manager_impl;
pub mod membership;
pub mod permissions;
pub mod storage;
pub mod token;
pub mod types;

pub use access::{can_perform, resolve_access, visible_to, AccessResult};
pub use async_manager::AsyncBoardManager;
pub use board::{Board, BoardSettings, Column, Member, Task};
pub use directory::{InMemoryDirectory, UserDirectory, UserProfile};
pub use errors::{BoardError, ErrorKind};
pub use invite::{InviteLink, InviteOptions};
pub use manager::{AcceptedInvite, BoardManager, InviteManager, MemberView, MembershipManager, NewBoard};
pub use manager_impl::BoardManagerImpl;
pub use permissions::{permissions_for_role, Action, PermissionSet, Role};
pub use storage::{BoardSqlStore, BoardStore, MemoryBoardStore, StoreError};
pub use token::{InviteClaims, InviteTokenSigner, TokenError};
pub use types::{BoardId, ColumnId, LinkId, TaskId, Timestamp, UserId};

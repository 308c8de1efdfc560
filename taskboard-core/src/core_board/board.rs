//! Board aggregate and its membership records

use super::errors::BoardError;
use super::invite::InviteLink;
use super::permissions::{PermissionSet, Role};
use super::types::{BoardId, ColumnId, LinkId, TaskId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum board name length in characters
pub const MAX_BOARD_NAME_LEN: usize = 100;

/// Columns every new board starts with
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// A shared task board. The unit of consistency for all membership changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Unique identifier
    pub id: BoardId,

    /// Human-readable name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Ordered columns
    pub columns: Vec<Column>,

    /// Tasks keyed by id
    pub tasks: HashMap<TaskId, Task>,

    /// Owner of the board. Ownership is never represented by a member record.
    pub created_by: UserId,

    /// Public boards grant read access to everyone
    pub is_public: bool,

    /// Members in join order
    pub members: Vec<Member>,

    /// Every invite link ever issued for this board, revoked ones included
    pub invite_links: Vec<InviteLink>,

    /// Sharing defaults
    pub settings: BoardSettings,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,

    /// Optimistic concurrency token, bumped by the store on every save
    #[serde(default)]
    pub version: u64,
}

impl Board {
    /// Create a new private board owned by `created_by`
    pub fn new(name: String, created_by: UserId) -> Result<Self, BoardError> {
        validate_board_name(&name)?;

        let now = Timestamp::now();
        let columns = DEFAULT_COLUMNS
            .iter()
            .enumerate()
            .map(|(position, title)| Column {
                id: ColumnId::generate(),
                title: title.to_string(),
                position: position as u32,
                task_ids: Vec::new(),
            })
            .collect();

        Ok(Board {
            id: BoardId::generate(),
            name,
            description: None,
            columns,
            tasks: HashMap::new(),
            created_by,
            is_public: false,
            members: Vec::new(),
            invite_links: Vec::new(),
            settings: BoardSettings::default(),
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.created_by == user_id
    }

    /// Look up a member record
    pub fn member(&self, user_id: &UserId) -> Option<&Member> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    pub fn member_mut(&mut self, user_id: &UserId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| &m.user_id == user_id)
    }

    /// Owner or member record holder
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.is_owner(user_id) || self.member(user_id).is_some()
    }

    pub fn link(&self, link_id: &LinkId) -> Option<&InviteLink> {
        self.invite_links.iter().find(|l| &l.id == link_id)
    }

    pub fn link_mut(&mut self, link_id: &LinkId) -> Option<&mut InviteLink> {
        self.invite_links.iter_mut().find(|l| &l.id == link_id)
    }

    pub fn link_by_token_mut(&mut self, token: &str) -> Option<&mut InviteLink> {
        self.invite_links.iter_mut().find(|l| l.token == token)
    }

    /// Record a modification
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

/// Validate a board name
pub fn validate_board_name(name: &str) -> Result<(), BoardError> {
    if name.trim().is_empty() {
        return Err(BoardError::InvalidInput("board name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_BOARD_NAME_LEN {
        return Err(BoardError::InvalidInput(format!(
            "board name must be at most {} characters",
            MAX_BOARD_NAME_LEN
        )));
    }
    Ok(())
}

/// A column on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub position: u32,
    /// Tasks in display order
    pub task_ids: Vec<TaskId>,
}

/// A task card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub column_id: ColumnId,
    pub title: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Board member information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// User ID of the member
    pub user_id: UserId,

    /// Role on the board. Never `Owner`.
    pub role: Role,

    /// Who added or invited this member
    pub invited_by: UserId,

    /// When the membership was granted
    pub invited_at: Timestamp,

    /// When the member joined
    pub joined_at: Option<Timestamp>,
}

impl Member {
    pub fn permissions(&self) -> PermissionSet {
        self.role.permissions()
    }
}

/// Sharing defaults for a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSettings {
    /// Role handed out by invite links created without an explicit role
    pub default_role: Role,

    /// Whether new members are expected to be approved by an admin
    pub require_approval: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            default_role: Role::Editor,
            require_approval: false,
        }
    }
}

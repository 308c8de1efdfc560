//! Board roles and the permission catalog
//!
//! A role fully determines what a user may do on a board. Permission sets are
//! never stored; they are derived from the role on every read.

use super::errors::BoardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board-level roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Board creator. Only ever derived from `Board::created_by`.
    Owner,
    /// Same capabilities as the owner, but removable and demotable
    Admin,
    /// Can view and edit board content
    Editor,
    /// Read-only access
    Viewer,
}

impl Role {
    /// Roles that member and invite APIs may hand out.
    pub const ASSIGNABLE: [Role; 3] = [Role::Admin, Role::Editor, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    /// Whether this role can be granted through member mutation or invite links
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Role::Owner)
    }

    /// Reject roles that cannot be granted
    pub fn ensure_assignable(self) -> Result<Role, BoardError> {
        if self.is_assignable() {
            Ok(self)
        } else {
            Err(BoardError::InvalidRole(self.as_str().to_string()))
        }
    }

    pub fn permissions(&self) -> PermissionSet {
        permissions_for_role(Some(*self))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            _ => Err(BoardError::InvalidRole(s.to_string())),
        }
    }
}

/// Capabilities a permission set can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Edit,
    Delete,
    Invite,
    ManageMembers,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::View => "view",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Invite => "invite",
            Action::ManageMembers => "manage_members",
        };
        write!(f, "{}", name)
    }
}

/// Five independent capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_invite: bool,
    pub can_manage_members: bool,
}

impl PermissionSet {
    /// No capabilities at all
    pub const NONE: PermissionSet = PermissionSet {
        can_view: false,
        can_edit: false,
        can_delete: false,
        can_invite: false,
        can_manage_members: false,
    };

    /// Owner and admin
    pub const FULL: PermissionSet = PermissionSet {
        can_view: true,
        can_edit: true,
        can_delete: true,
        can_invite: true,
        can_manage_members: true,
    };

    pub const EDITOR: PermissionSet = PermissionSet {
        can_view: true,
        can_edit: true,
        can_delete: false,
        can_invite: false,
        can_manage_members: false,
    };

    pub const VIEWER: PermissionSet = PermissionSet {
        can_view: true,
        can_edit: false,
        can_delete: false,
        can_invite: false,
        can_manage_members: false,
    };

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.can_view,
            Action::Edit => self.can_edit,
            Action::Delete => self.can_delete,
            Action::Invite => self.can_invite,
            Action::ManageMembers => self.can_manage_members,
        }
    }
}

/// Map a role (or its absence) to its capability set.
pub fn permissions_for_role(role: Option<Role>) -> PermissionSet {
    match role {
        Some(Role::Owner) | Some(Role::Admin) => PermissionSet::FULL,
        Some(Role::Editor) => PermissionSet::EDITOR,
        Some(Role::Viewer) => PermissionSet::VIEWER,
        None => PermissionSet::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_role() -> impl Strategy<Value = Option<Role>> {
        prop_oneof![
            Just(None),
            Just(Some(Role::Owner)),
            Just(Some(Role::Admin)),
            Just(Some(Role::Editor)),
            Just(Some(Role::Viewer)),
        ]
    }

    proptest! {
        #[test]
        fn view_granted_to_every_role_but_none(role in any_role()) {
            prop_assert_eq!(permissions_for_role(role).can_view, role.is_some());
        }

        #[test]
        fn manage_members_implies_invite(role in any_role()) {
            let perms = permissions_for_role(role);
            prop_assert!(!perms.can_manage_members || perms.can_invite);
        }
    }

    #[test]
    fn test_admin_matches_owner() {
        assert_eq!(Role::Admin.permissions(), Role::Owner.permissions());
        assert_eq!(Role::Owner.permissions(), PermissionSet::FULL);
    }

    #[test]
    fn test_editor_and_viewer_sets() {
        let editor = Role::Editor.permissions();
        assert!(editor.can_view && editor.can_edit);
        assert!(!editor.can_delete && !editor.can_invite && !editor.can_manage_members);

        let viewer = Role::Viewer.permissions();
        assert!(viewer.allows(Action::View));
        assert!(!viewer.allows(Action::Edit));
    }

    #[test]
    fn test_default_set_is_empty() {
        assert_eq!(permissions_for_role(None), PermissionSet::default());
        assert_eq!(PermissionSet::default(), PermissionSet::NONE);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Editor".parse::<Role>().unwrap(), Role::Editor);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!(matches!("superuser".parse::<Role>(), Err(BoardError::InvalidRole(_))));
    }

    #[test]
    fn test_owner_is_not_assignable() {
        assert!(matches!(
            Role::Owner.ensure_assignable(),
            Err(BoardError::InvalidRole(_))
        ));
        for role in Role::ASSIGNABLE {
            assert_eq!(role.ensure_assignable().unwrap(), role);
        }
    }

    #[test]
    fn test_permission_set_wire_format() {
        let json = serde_json::to_value(PermissionSet::VIEWER).unwrap();
        assert_eq!(json["canView"], true);
        assert_eq!(json["canManageMembers"], false);
    }
}

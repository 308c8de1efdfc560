//! User directory lookups for member listings
//!
//! Profiles belong to the identity subsystem. The engine only reads them to
//! enrich member listings and never fails an operation on a missing profile.

use super::types::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::warn;

/// Public profile of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email: None,
            avatar_url: None,
        }
    }
}

/// Read-only view of the identity provider
pub trait UserDirectory: Send + Sync {
    fn profile(&self, user_id: &UserId) -> Option<UserProfile>;
}

/// Directory kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    ///
    /// Profiles are independent entries, so a writer that panicked cannot
    /// leave the map half-updated; a poisoned lock is recovered.
    pub fn upsert(&self, profile: UserProfile) {
        let mut profiles = self.profiles.write().unwrap_or_else(|poisoned| {
            warn!(user_id = %profile.user_id, "profile directory lock poisoned, recovering");
            self.profiles.clear_poison();
            poisoned.into_inner()
        });
        profiles.insert(profile.user_id.clone(), profile);
    }
}

impl UserDirectory for InMemoryDirectory {
    fn profile(&self, user_id: &UserId) -> Option<UserProfile> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        profiles.get(user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_profile() {
        let directory = InMemoryDirectory::new();
        let alice = UserId::new("alice");
        directory.upsert(UserProfile::new(alice.clone(), "Alice"));

        let mut renamed = UserProfile::new(alice.clone(), "Alice Liddell");
        renamed.email = Some("alice@example.com".to_string());
        directory.upsert(renamed.clone());

        assert_eq!(directory.profile(&alice), Some(renamed));
        assert!(directory.profile(&UserId::new("bob")).is_none());
    }

    #[test]
    fn test_upsert_survives_poisoned_lock() {
        let directory = InMemoryDirectory::new();
        let alice = UserId::new("alice");
        directory.upsert(UserProfile::new(alice.clone(), "Alice"));

        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = directory.profiles.write().unwrap();
                panic!("writer died");
            })
            .join()
        });
        assert!(directory.profiles.is_poisoned());

        let bob = UserId::new("bob");
        directory.upsert(UserProfile::new(bob.clone(), "Bob"));

        assert_eq!(directory.profile(&bob).unwrap().display_name, "Bob");
        assert_eq!(directory.profile(&alice).unwrap().display_name, "Alice");
        assert!(!directory.profiles.is_poisoned());
    }
}

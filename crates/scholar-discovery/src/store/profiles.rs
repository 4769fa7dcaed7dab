//! User profile repository.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::UserProfile;

/// Keyed store of user profiles.
#[async_trait::async_trait]
pub trait UserProfileStore: Send + Sync {
    /// Profile of `user_id`, if one exists.
    async fn get(&self, user_id: &str) -> Option<UserProfile>;

    /// Insert or replace a profile.
    async fn put(&self, profile: UserProfile);

    /// Every stored profile.
    async fn all(&self) -> Vec<UserProfile>;
}

/// In-memory profile store.
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl InMemoryProfileStore {
    /// Empty store. Profiles appear on a user's first recorded interaction.
    ///
    /// ```
    /// use scholar_discovery::{InMemoryProfileStore, UserProfileStore};
    /// use scholar_discovery::models::UserProfile;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let store = InMemoryProfileStore::new();
    /// assert!(store.is_empty().await);
    ///
    /// store.put(UserProfile::new("alice")).await;
    /// assert!(store.get("alice").await.is_some());
    /// # }
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `profiles`.
    #[must_use]
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let profiles = profiles.into_iter().map(|p| (p.user_id.clone(), p)).collect();
        Self { profiles: Arc::new(RwLock::new(profiles)) }
    }

    /// Number of stored profiles.
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl UserProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.read().await.get(user_id).cloned()
    }

    async fn put(&self, profile: UserProfile) {
        self.profiles.write().await.insert(profile.user_id.clone(), profile);
    }

    async fn all(&self) -> Vec<UserProfile> {
        let mut profiles: Vec<UserProfile> = self.profiles.read().await.values().cloned().collect();
        profiles.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        profiles
    }
}

impl std::fmt::Debug for InMemoryProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryProfileStore").finish_non_exhaustive()
    }
}

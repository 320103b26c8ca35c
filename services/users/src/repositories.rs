//! In-memory user repository

use std::sync::Arc;

use common::pagination::PageList;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::UserEntity;

/// Which branch an upsert took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed; the caller's identity was stored as given
    Created,
    /// An existing record was replaced in place
    Replaced,
}

/// User repository backed by an insertion-ordered map
///
/// Clones share the same store. A single lock guards the map, so every
/// mutation is visible to the next read.
#[derive(Debug, Clone, Default)]
pub struct UserRepository {
    users: Arc<RwLock<IndexMap<Uuid, UserEntity>>>,
}

impl UserRepository {
    /// Create an empty user repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Option<UserEntity> {
        debug!("Finding user by ID: {}", id);
        self.users.read().await.get(&id).cloned()
    }

    /// Store a new user, generating an identity when the entity has none
    pub async fn insert(&self, mut user: UserEntity) -> UserEntity {
        let mut users = self.users.write().await;

        if user.id.is_nil() {
            user.id = loop {
                let id = Uuid::new_v4();
                if !users.contains_key(&id) {
                    break id;
                }
            };
        }

        info!("Inserting user {} ({})", user.id, user.login);
        users.insert(user.id, user.clone());
        user
    }

    /// Replace the stored user at `user.id`
    ///
    /// Returns `false` and stores nothing when no such user exists.
    pub async fn update(&self, user: UserEntity) -> bool {
        let mut users = self.users.write().await;

        match users.get_mut(&user.id) {
            Some(slot) => {
                info!("Updating user {}", user.id);
                *slot = user;
                true
            }
            None => {
                debug!("Update skipped, user {} not found", user.id);
                false
            }
        }
    }

    /// Replace the user at `user.id`, or insert it under exactly that identity
    pub async fn update_or_insert(&self, user: UserEntity) -> UpsertOutcome {
        let mut users = self.users.write().await;

        match users.get_mut(&user.id) {
            Some(slot) => {
                info!("Replacing user {}", user.id);
                *slot = user;
                UpsertOutcome::Replaced
            }
            None => {
                info!("Inserting user {} with caller identity", user.id);
                users.insert(user.id, user);
                UpsertOutcome::Created
            }
        }
    }

    /// Edit a stored user in place under one write guard
    ///
    /// `edit` works on a copy; the copy is stored only when it returns `Ok`.
    /// Returns `None` when no such user exists.
    pub async fn update_with<F, E>(&self, id: Uuid, edit: F) -> Option<Result<UserEntity, E>>
    where
        F: FnOnce(&mut UserEntity) -> Result<(), E>,
    {
        let mut users = self.users.write().await;
        let slot = users.get_mut(&id)?;

        let mut user = slot.clone();
        if let Err(e) = edit(&mut user) {
            debug!("Edit of user {} rejected", id);
            return Some(Err(e));
        }

        // identity is fixed once assigned
        user.id = id;
        *slot = user.clone();
        info!("Updated user {}", id);
        Some(Ok(user))
    }

    /// Delete a user by ID; deleting a missing user does nothing
    ///
    /// Returns whether this call removed the user.
    pub async fn delete(&self, id: Uuid) -> bool {
        let removed = self.users.write().await.shift_remove(&id).is_some();
        if removed {
            info!("Deleted user {}", id);
        }
        removed
    }

    /// Get one page of users in insertion order
    pub async fn get_page(&self, page_number: usize, page_size: usize) -> PageList<UserEntity> {
        let users = self.users.read().await;
        PageList::from_window(users.values().cloned(), users.len(), page_number, page_size)
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(login: &str) -> UserEntity {
        UserEntity::unsaved(login, "First", "Last")
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let repository = UserRepository::new();
        let stored = repository.insert(user("alice")).await;

        assert!(!stored.id.is_nil());
        let found = repository.find_by_id(stored.id).await.expect("user stored");
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn test_insert_keeps_supplied_identity() {
        let repository = UserRepository::new();
        let id = Uuid::new_v4();
        let mut entity = user("bob");
        entity.id = id;

        assert_eq!(repository.insert(entity).await.id, id);
    }

    #[tokio::test]
    async fn test_find_unknown_is_none() {
        let repository = UserRepository::new();
        assert!(repository.find_by_id(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_existing_only() {
        let repository = UserRepository::new();
        let mut stored = repository.insert(user("carol")).await;

        stored.games_played = 3;
        assert!(repository.update(stored.clone()).await);
        assert_eq!(repository.find_by_id(stored.id).await, Some(stored));

        let stranger = UserEntity::new(Uuid::new_v4());
        assert!(!repository.update(stranger.clone()).await);
        assert!(repository.find_by_id(stranger.id).await.is_none());
    }

    #[tokio::test]
    async fn test_upsert_fresh_identity_is_created_verbatim() {
        let repository = UserRepository::new();
        let id = Uuid::new_v4();
        let mut entity = user("dave");
        entity.id = id;

        assert_eq!(repository.update_or_insert(entity).await, UpsertOutcome::Created);
        assert_eq!(repository.find_by_id(id).await.map(|u| u.id), Some(id));
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_existing_identity_is_replaced() {
        let repository = UserRepository::new();
        let stored = repository.insert(user("erin")).await;

        let mut replacement = user("erin2");
        replacement.id = stored.id;

        assert_eq!(
            repository.update_or_insert(replacement).await,
            UpsertOutcome::Replaced
        );
        let found = repository.find_by_id(stored.id).await.expect("user stored");
        assert_eq!(found.id, stored.id);
        assert_eq!(found.login, "erin2");
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repository = UserRepository::new();
        let stored = repository.insert(user("frank")).await;

        assert!(repository.delete(stored.id).await);
        assert!(!repository.delete(stored.id).await);

        assert!(repository.find_by_id(stored.id).await.is_none());
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_deletes_remove_once() {
        let repository = UserRepository::new();
        let stored = repository.insert(user("gina")).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repository = repository.clone();
                tokio::spawn(async move { repository.delete(stored.id).await })
            })
            .collect();

        let mut removed = 0;
        for handle in handles {
            if handle.await.expect("delete task") {
                removed += 1;
            }
        }

        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_update_with_commits_only_on_success() {
        let repository = UserRepository::new();
        let stored = repository.insert(user("hank")).await;

        let rejected = repository
            .update_with(stored.id, |user| {
                user.login = "changed".to_string();
                Err("nope")
            })
            .await;
        assert_eq!(rejected, Some(Err("nope")));
        assert_eq!(repository.find_by_id(stored.id).await, Some(stored.clone()));

        let updated = repository
            .update_with(stored.id, |user| {
                user.games_played += 1;
                Ok::<_, ()>(())
            })
            .await
            .expect("user exists")
            .expect("edit accepted");
        assert_eq!(updated.games_played, 1);
        assert_eq!(repository.find_by_id(stored.id).await, Some(updated));

        let missing = repository
            .update_with(Uuid::new_v4(), |_| Ok::<_, ()>(()))
            .await;
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_edits_are_not_lost() {
        let repository = UserRepository::new();
        let stored = repository.insert(user("ivy")).await;

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let repository = repository.clone();
                tokio::spawn(async move {
                    repository
                        .update_with(stored.id, |user| {
                            user.games_played += 1;
                            Ok::<_, ()>(())
                        })
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.expect("edit task");
        }

        let found = repository.find_by_id(stored.id).await.expect("user stored");
        assert_eq!(found.games_played, 50);
    }

    #[tokio::test]
    async fn test_page_follows_insertion_order() {
        let repository = UserRepository::new();
        let mut ids = Vec::new();
        for login in ["a", "b", "c", "d", "e"] {
            ids.push(repository.insert(user(login)).await.id);
        }

        repository.delete(ids[1]).await;

        let mut replacement = user("c2");
        replacement.id = ids[2];
        repository.update_or_insert(replacement).await;

        let page = repository.get_page(1, 10).await;
        let logins: Vec<_> = page.items.iter().map(|u| u.login.as_str()).collect();
        assert_eq!(logins, vec!["a", "c2", "d", "e"]);

        let second = repository.get_page(2, 3).await;
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].login, "e");
        assert_eq!(second.total_count, 4);
        assert_eq!(second.total_pages, 2);
        assert!(second.has_previous());
        assert!(!second.has_next());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_are_all_kept() {
        let repository = UserRepository::new();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let repository = repository.clone();
                tokio::spawn(async move { repository.insert(user(&format!("user{}", i))).await })
            })
            .collect();

        for handle in handles {
            handle.await.expect("insert task");
        }

        assert_eq!(repository.len().await, 32);
    }
}

use crate::domain::repository::UserRepository;
use crate::domain::user::{User, UserId};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self), fields(user_id = %user.id, email = %user.email))]
    async fn save_user(&self, user: User) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(user.id, user.clone());
        debug!(user_id = %user.id, email = %user.email, "User saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let storage = self.storage.read().await;
        let user = storage.values().find(|u| u.email == email).cloned();
        match &user {
            Some(u) => debug!(user_id = %u.id, "User found by email"),
            None => trace!(email = email, "User not found by email"),
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>> {
        let storage = self.storage.read().await;
        let user = storage.get(id).cloned();
        if user.is_none() {
            trace!(user_id = %id, "User not found by id");
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(name: &str, email: &str) -> User {
        User {
            id: UserId::new(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$fake".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_user_and_find_by_id() {
        let repo = InMemoryUserRepository::new();
        let user = sample_user("Alice", "alice@example.com");

        repo.save_user(user.clone()).await.unwrap();

        let retrieved = repo.find_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(retrieved.id, user.id);
        assert_eq!(retrieved.name, "Alice");
        assert_eq!(retrieved.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let repo = InMemoryUserRepository::new();
        let user = sample_user("Bob", "bob@example.com");

        repo.save_user(user.clone()).await.unwrap();

        let found = repo.find_user_by_email("bob@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_find_user_by_email_returns_none_for_unknown() {
        let repo = InMemoryUserRepository::new();

        let found = repo
            .find_user_by_email("nonexistent@example.com")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_user_by_id_returns_none_for_unknown() {
        let repo = InMemoryUserRepository::new();

        let found = repo.find_user_by_id(&UserId::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_user_by_email_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(sample_user("Carol", "Carol@Example.com"))
            .await
            .unwrap();

        assert!(
            repo.find_user_by_email("Carol@Example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            repo.find_user_by_email("carol@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_concurrent_reads() {
        let repo = InMemoryUserRepository::new();
        let user = sample_user("Dan", "dan@example.com");
        let id = user.id;
        repo.save_user(user).await.unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let repo_clone = repo.clone();
                tokio::spawn(async move { repo_clone.find_user_by_id(&id).await })
            })
            .collect();

        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.unwrap().id, id);
        }
    }
}

use crate::domain::todo::{Todo, TodoId};
use crate::domain::user::{User, UserId};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save_user(&self, user: User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>>;
}

#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn save(&self, todo: Todo) -> Result<()>;
    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>>;
    /// Todos owned by `user`, newest-created first.
    async fn list_by_user(&self, user: &UserId) -> Result<Vec<Todo>>;
    async fn update(&self, todo: Todo) -> Result<()>;
    /// Returns false when the id was already absent.
    async fn delete(&self, id: &TodoId) -> Result<bool>;
}

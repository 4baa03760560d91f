use crate::domain::repository::TodoRepository;
use crate::domain::todo::{Todo, TodoId};
use crate::domain::user::UserId;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

/// In-memory document store for todos. Each entry carries an insertion
/// sequence so newest-first ordering stays stable even when two todos share
/// a creation timestamp.
#[derive(Clone)]
pub struct InMemoryTodoRepository {
    storage: Arc<RwLock<HashMap<TodoId, (u64, Todo)>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    #[instrument(skip(self), fields(todo_id = %todo.id, user_id = %todo.user))]
    async fn save(&self, todo: Todo) -> Result<()> {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let mut storage = self.storage.write().await;
        storage.insert(todo.id, (seq, todo));
        debug!("Todo saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>> {
        let storage = self.storage.read().await;
        let todo = storage.get(id).map(|(_, t)| t.clone());
        if todo.is_none() {
            trace!(todo_id = %id, "Todo not found");
        }
        Ok(todo)
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn list_by_user(&self, user: &UserId) -> Result<Vec<Todo>> {
        let storage = self.storage.read().await;
        let mut entries: Vec<_> = storage
            .values()
            .filter(|(_, t)| t.user == *user)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        let todos: Vec<Todo> = entries.into_iter().map(|(_, t)| t).collect();
        debug!(count = todos.len(), "Listed todos for user");
        Ok(todos)
    }

    #[instrument(skip(self), fields(todo_id = %todo.id))]
    async fn update(&self, todo: Todo) -> Result<()> {
        let mut storage = self.storage.write().await;
        // Keep the original insertion sequence so updates do not reorder the list.
        let seq = storage
            .get(&todo.id)
            .map(|(seq, _)| *seq)
            .unwrap_or_else(|| self.sequence.fetch_add(1, Ordering::Relaxed));
        storage.insert(todo.id, (seq, todo));
        Ok(())
    }

    #[instrument(skip(self), fields(todo_id = %id))]
    async fn delete(&self, id: &TodoId) -> Result<bool> {
        let mut storage = self.storage.write().await;
        let removed = storage.remove(id).is_some();
        debug!(removed = removed, "Todo delete attempted");
        Ok(removed)
    }
}

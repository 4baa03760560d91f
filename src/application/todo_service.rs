use crate::domain::error::DomainError;
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};
use crate::domain::user::UserId;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct TodoService<R: TodoRepository> {
    repository: Arc<R>,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Todo>> {
        let todos = self.repository.list_by_user(user_id).await?;
        debug!(count = todos.len(), "Todos listed");
        Ok(todos)
    }

    #[instrument(skip(self, req), fields(user_id = %user_id))]
    pub async fn create(&self, user_id: UserId, req: CreateTodo) -> Result<Todo> {
        if req.title.trim().is_empty() {
            warn!("Todo creation rejected, empty title");
            return Err(DomainError::Validation("Title is required".to_string()).into());
        }

        let todo = Todo {
            id: TodoId::new(),
            title: req.title,
            description: req.description,
            completed: false,
            priority: req.priority.unwrap_or_default(),
            due_date: req.due_date,
            user: user_id,
            created_at: Utc::now(),
        };

        self.repository.save(todo.clone()).await?;

        info!(todo_id = %todo.id, "Todo created");
        Ok(todo)
    }

    #[instrument(skip(self, req), fields(user_id = %user_id, todo_id = %todo_id))]
    pub async fn update(
        &self,
        user_id: &UserId,
        todo_id: &TodoId,
        req: UpdateTodo,
    ) -> Result<Todo> {
        let mut todo = self.find_owned(user_id, todo_id, "update").await?;

        if let Some(title) = req.title {
            if title.trim().is_empty() {
                return Err(DomainError::Validation("Title is required".to_string()).into());
            }
            todo.title = title;
        }
        if let Some(completed) = req.completed {
            todo.completed = completed;
        }
        if let Some(priority) = req.priority {
            todo.priority = priority;
        }
        // Double Option: absent leaves the value alone, explicit null clears it.
        if let Some(description) = req.description {
            todo.description = description;
        }
        if let Some(due_date) = req.due_date {
            todo.due_date = due_date;
        }

        self.repository.update(todo.clone()).await?;

        info!(todo_id = %todo.id, "Todo updated");
        Ok(todo)
    }

    #[instrument(skip(self), fields(user_id = %user_id, todo_id = %todo_id))]
    pub async fn delete(&self, user_id: &UserId, todo_id: &TodoId) -> Result<()> {
        self.find_owned(user_id, todo_id, "delete").await?;

        let removed = self.repository.delete(todo_id).await?;
        if !removed {
            // Lost a race with another delete of the same id.
            return Err(DomainError::NotFound("Todo not found".to_string()).into());
        }

        info!(todo_id = %todo_id, "Todo deleted");
        Ok(())
    }

    /// An unknown id is not-found for any caller; an existing todo with a
    /// different owner is forbidden, never silently filtered.
    async fn find_owned(&self, user_id: &UserId, todo_id: &TodoId, action: &str) -> Result<Todo> {
        let todo = self
            .repository
            .find_by_id(todo_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Todo not found".to_string()))?;

        if todo.user != *user_id {
            warn!(owner = %todo.user, "Ownership check failed");
            return Err(
                DomainError::Forbidden(format!("Not authorized to {} this todo", action)).into(),
            );
        }

        Ok(todo)
    }
}

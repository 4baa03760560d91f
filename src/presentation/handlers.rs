use crate::application::auth_service::AuthService;
use crate::application::todo_service::TodoService;
use crate::data::todo_repository::InMemoryTodoRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub todo_service: TodoService<InMemoryTodoRepository>,
    pub auth_service: Arc<AuthService<InMemoryUserRepository>>,
}

// Uniform error body; the client surfaces `message` verbatim.
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Server error")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Validation(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => actix_web::http::StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => actix_web::http::StatusCode::CONFLICT,
            ApiError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            ApiError::Validation(msg) => warn!(status = %status, message = %msg, "Validation error"),
            ApiError::Unauthorized(msg) => warn!(status = %status, message = %msg, "Unauthorized"),
            ApiError::Forbidden(msg) => warn!(status = %status, message = %msg, "Forbidden"),
            ApiError::NotFound(msg) => warn!(status = %status, message = %msg, "Resource not found"),
            ApiError::Conflict(msg) => warn!(status = %status, message = %msg, "Conflict"),
            // Internal detail is logged here and never reaches the body.
            ApiError::Internal(detail) => error!(status = %status, detail = %detail, "Internal error"),
        }

        HttpResponse::build(status).json(ErrorResponse {
            message: self.to_string(),
        })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::Unauthorized(msg)) => ApiError::Unauthorized(msg.clone()),
            Some(DomainError::Forbidden(msg)) => ApiError::Forbidden(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Conflict(msg)) => ApiError::Conflict(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

// AuthenticatedUser extractor, populated by JwtAuthMiddleware
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))
        })
    }
}

// Response shapes

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[derive(Serialize)]
struct TodoListResponse {
    success: bool,
    count: usize,
    todos: Vec<Todo>,
}

#[derive(Serialize)]
struct TodoResponse {
    success: bool,
    message: String,
    todo: Todo,
}

#[derive(Serialize)]
struct AckResponse {
    success: bool,
    message: String,
}

fn parse_todo_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("Todo not found".to_string()))
}

// Handlers

#[instrument]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state), fields(user_id = %identity.0))]
pub async fn list_todos(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let todos = state.todo_service.list(&identity.0).await.map_err(|e| {
        error!(error = %e, "Failed to list todos");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(TodoListResponse {
        success: true,
        count: todos.len(),
        todos,
    }))
}

#[instrument(skip(state, req), fields(user_id = %identity.0, todo_id))]
pub async fn create_todo(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    req: web::Json<CreateTodo>,
) -> Result<HttpResponse, ApiError> {
    let todo = state
        .todo_service
        .create(identity.0, req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create todo");
            ApiError::from(e)
        })?;

    tracing::Span::current().record("todo_id", tracing::field::display(todo.id));
    info!("Todo created successfully");
    Ok(HttpResponse::Created().json(TodoResponse {
        success: true,
        message: "Todo created successfully".to_string(),
        todo,
    }))
}

#[instrument(skip(state, req), fields(user_id = %identity.0, todo_id = %path))]
pub async fn update_todo(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    path: web::Path<String>,
    req: web::Json<UpdateTodo>,
) -> Result<HttpResponse, ApiError> {
    let todo_id = parse_todo_id(&path)?;

    let todo = state
        .todo_service
        .update(&identity.0, &todo_id, req.into_inner())
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to update todo");
            ApiError::from(e)
        })?;

    info!("Todo updated successfully");
    Ok(HttpResponse::Ok().json(TodoResponse {
        success: true,
        message: "Todo updated successfully".to_string(),
        todo,
    }))
}

#[instrument(skip(state), fields(user_id = %identity.0, todo_id = %path))]
pub async fn delete_todo(
    state: web::Data<AppState>,
    identity: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let todo_id = parse_todo_id(&path)?;

    state
        .todo_service
        .delete(&identity.0, &todo_id)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to delete todo");
            ApiError::from(e)
        })?;

    info!("Todo deleted successfully");
    Ok(HttpResponse::Ok().json(AckResponse {
        success: true,
        message: "Todo deleted successfully".to_string(),
    }))
}

use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};
use crate::domain::user::{CreateUser, LoginRequest};
use crate::presentation::auth::AuthResponse;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server rejected the request; `message` is shown to the user
    /// verbatim.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TodoListBody {
    todos: Vec<Todo>,
}

#[derive(Debug, Deserialize)]
struct TodoBody {
    todo: Todo,
}

#[derive(Debug, Deserialize)]
struct AckBody {
    message: String,
}

/// HTTP gateway to the todo API. Holds the session token and attaches it
/// as a bearer header on every protected call.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<AuthResponse, ApiClientError> {
        let request = CreateUser {
            name,
            email,
            password,
        };
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn login(
        &self,
        email: String,
        password: String,
    ) -> Result<AuthResponse, ApiClientError> {
        let request = LoginRequest { email, password };
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>, ApiClientError> {
        let response = self
            .authorized(self.http.get(self.url("/api/todos")))
            .send()
            .await?;
        let body: TodoListBody = decode(response).await?;
        debug!(count = body.todos.len(), "Fetched todos");
        Ok(body.todos)
    }

    pub async fn create_todo(&self, req: &CreateTodo) -> Result<Todo, ApiClientError> {
        let response = self
            .authorized(self.http.post(self.url("/api/todos")))
            .json(req)
            .send()
            .await?;
        let body: TodoBody = decode(response).await?;
        Ok(body.todo)
    }

    pub async fn update_todo(
        &self,
        id: &TodoId,
        req: &UpdateTodo,
    ) -> Result<Todo, ApiClientError> {
        let response = self
            .authorized(self.http.put(self.url(&format!("/api/todos/{}", id))))
            .json(req)
            .send()
            .await?;
        let body: TodoBody = decode(response).await?;
        Ok(body.todo)
    }

    pub async fn delete_todo(&self, id: &TodoId) -> Result<String, ApiClientError> {
        let response = self
            .authorized(self.http.delete(self.url(&format!("/api/todos/{}", id))))
            .send()
            .await?;
        let body: AckBody = decode(response).await?;
        Ok(body.message)
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ApiClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());
        return Err(ApiClientError::Api { status, message });
    }
    Ok(response.json().await?)
}

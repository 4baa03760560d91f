use crate::client::api::{ApiClient, ApiClientError};
use crate::presentation::auth::UserResponse;
use tracing::info;

/// Outcome reported to views. Login and register never propagate errors;
/// the failure message goes into the alert instead.
#[derive(Debug)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

/// A previously issued session, used to rehydrate the context on startup.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub user: UserResponse,
}

/// Client-side authentication state: the current user and session token.
/// Populated by `login`/`register`, cleared by `logout`.
#[derive(Default)]
pub struct AuthContext {
    user: Option<UserResponse>,
    token: Option<String>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a saved session into the context and the gateway.
    pub fn hydrate(&mut self, api: &mut ApiClient, session: Option<Session>) {
        if let Some(session) = session {
            api.set_token(session.token.clone());
            self.token = Some(session.token);
            self.user = Some(session.user);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user(&self) -> Option<&UserResponse> {
        self.user.as_ref()
    }

    pub async fn login(&mut self, api: &mut ApiClient, email: String, password: String) -> AuthOutcome {
        match api.login(email, password).await {
            Ok(auth) => self.establish(api, auth.token, auth.user, auth.message),
            Err(e) => failure(e),
        }
    }

    pub async fn register(
        &mut self,
        api: &mut ApiClient,
        name: String,
        email: String,
        password: String,
    ) -> AuthOutcome {
        match api.register(name, email, password).await {
            Ok(auth) => self.establish(api, auth.token, auth.user, auth.message),
            Err(e) => failure(e),
        }
    }

    pub fn logout(&mut self, api: &mut ApiClient) {
        info!("Clearing session state");
        self.user = None;
        self.token = None;
        api.clear_token();
    }

    fn establish(
        &mut self,
        api: &mut ApiClient,
        token: String,
        user: UserResponse,
        message: String,
    ) -> AuthOutcome {
        info!(user_id = %user.id, "Session established");
        api.set_token(token.clone());
        self.token = Some(token);
        self.user = Some(user);
        AuthOutcome {
            success: true,
            message,
        }
    }
}

fn failure(e: ApiClientError) -> AuthOutcome {
    AuthOutcome {
        success: false,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;

    fn sample_user() -> UserResponse {
        UserResponse {
            id: UserId::new(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        }
    }

    #[test]
    fn test_new_context_is_unauthenticated() {
        let ctx = AuthContext::new();

        assert!(!ctx.is_authenticated());
        assert!(ctx.user().is_none());
    }

    #[test]
    fn test_hydrate_populates_context_and_gateway() {
        let mut ctx = AuthContext::new();
        let mut api = ApiClient::new("http://localhost:5000");

        ctx.hydrate(
            &mut api,
            Some(Session {
                token: "saved-token".to_string(),
                user: sample_user(),
            }),
        );

        assert!(ctx.is_authenticated());
        assert!(api.has_token());
        assert_eq!(ctx.user().unwrap().name, "Alice");
    }

    #[test]
    fn test_hydrate_without_session_stays_unauthenticated() {
        let mut ctx = AuthContext::new();
        let mut api = ApiClient::new("http://localhost:5000");

        ctx.hydrate(&mut api, None);

        assert!(!ctx.is_authenticated());
        assert!(!api.has_token());
    }

    #[test]
    fn test_logout_clears_context_and_gateway() {
        let mut ctx = AuthContext::new();
        let mut api = ApiClient::new("http://localhost:5000");
        ctx.hydrate(
            &mut api,
            Some(Session {
                token: "saved-token".to_string(),
                user: sample_user(),
            }),
        );

        ctx.logout(&mut api);

        assert!(!ctx.is_authenticated());
        assert!(ctx.user().is_none());
        assert!(!api.has_token());
    }
}

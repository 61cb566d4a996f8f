//! Authentication against the attendance backend
//!
//! [`LoginClient`] is the port to the login endpoint; [`AuthService`] turns a
//! successful login into an [`AuthSession`], the identity the session
//! controller keeps while logged in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::LoginError;
use crate::models::{LoginCredentials, User};

/// Message used when the backend refuses a login without saying why
pub const DEFAULT_LOGIN_FAILURE: &str = "Login failed";

/// Login endpoint port
#[async_trait]
pub trait LoginClient: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, LoginError>;
}

/// Request body for `POST /api/login`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response body for `POST /api/login`
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub status: Option<String>,
    pub user: Option<User>,
    pub message: Option<String>,
}

impl LoginResponse {
    /// Interpret the body independently of the HTTP status
    pub fn into_result(self) -> Result<User, LoginError> {
        if self.status.as_deref() == Some("success") {
            return self
                .user
                .ok_or_else(|| LoginError::Transport("login response has no user".to_string()));
        }

        Err(LoginError::Rejected(
            self.message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string()),
        ))
    }
}

/// `reqwest` implementation of [`LoginClient`]
#[derive(Clone)]
pub struct HttpLoginClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLoginClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self) -> String {
        format!("{}/api/login", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LoginClient for HttpLoginClient {
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, LoginError> {
        let response = self
            .client
            .post(self.url())
            .json(&LoginRequest {
                username: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| LoginError::Transport(e.to_string()))?;

        let status = response.status();
        match response.json::<LoginResponse>().await {
            Ok(body) => body.into_result(),
            Err(_) if !status.is_success() => Err(LoginError::Transport(format!(
                "server responded with {}",
                status
            ))),
            Err(e) => Err(LoginError::Transport(format!("invalid response: {}", e))),
        }
    }
}

/// Identity held by the controller for one logged-in lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    /// Fresh for every login, used to recognise stale completions
    pub id: Uuid,
    pub user: User,
}

/// Exchanges credentials for an [`AuthSession`]
#[derive(Clone)]
pub struct AuthService {
    client: Arc<dyn LoginClient>,
}

impl AuthService {
    pub fn new(client: Arc<dyn LoginClient>) -> Self {
        Self { client }
    }

    pub async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, LoginError> {
        info!("Login attempt for user: {}", credentials.email);

        match self.client.login(credentials).await {
            Ok(user) => {
                let session = AuthSession {
                    id: Uuid::new_v4(),
                    user,
                };
                info!("Login succeeded for {} (session {})", session.user.email, session.id);
                Ok(session)
            }
            Err(e) => {
                warn!("Login failed for {}: {}", credentials.email, e);
                Err(e)
            }
        }
    }
}

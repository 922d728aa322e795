//! Session Service
//!
//! Credential login producing opaque bearer tokens, plus token resolution
//! for the request middleware. Wrong email and wrong password are reported
//! identically.

use std::sync::Arc;

use tracing::info;

use crate::auth::password_service::PasswordService;
use crate::auth::session::Session;
use crate::auth::session_repository::SessionRepository;
use crate::shared::authorization_service::{AuthContext, AuthorizationService};
use crate::shared::error::{HubError, Result};
use crate::user::repository::UserRepository;

pub struct SessionService {
    session_repo: Arc<SessionRepository>,
    user_repo: Arc<UserRepository>,
    password_service: Arc<PasswordService>,
    authz_service: Arc<AuthorizationService>,
}

impl SessionService {
    pub fn new(
        session_repo: Arc<SessionRepository>,
        user_repo: Arc<UserRepository>,
        password_service: Arc<PasswordService>,
        authz_service: Arc<AuthorizationService>,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
            password_service,
            authz_service,
        }
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(HubError::InvalidCredentials)?;
        if !self.password_service.verify_password(password, &user.password_hash)? {
            return Err(HubError::InvalidCredentials);
        }

        let session = Session::open(&user.id);
        self.session_repo.insert(&session).await?;
        info!(user_id = %user.id, "Session opened");
        Ok(session)
    }

    /// Resolve a bearer token into the caller's context.
    pub async fn authenticate(&self, token: &str) -> Result<AuthContext> {
        let session = self
            .session_repo
            .find_by_token(token)
            .await?
            .ok_or_else(|| HubError::unauthorized("Invalid session token"))?;
        let user = self
            .user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or_else(|| HubError::unauthorized("Session user no longer exists"))?;
        Ok(self.authz_service.build_context(&user))
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.session_repo.delete_by_token(token).await?;
        Ok(())
    }
}

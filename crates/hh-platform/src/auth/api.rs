//! Auth API

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::session_service::SessionService;
use crate::shared::api_common::SuccessResponse;
use crate::shared::error::{HubError, Result};
use crate::shared::middleware::{extract_bearer_token, Authenticated};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent requests
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
}

#[derive(Clone)]
pub struct AuthApiState {
    pub session_service: Arc<SessionService>,
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let session = state
        .session_service
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(LoginResponse {
        token: session.token,
    }))
}

/// Close the current session
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session closed", body = SuccessResponse),
        (status = 401, description = "Missing token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AuthApiState>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| HubError::unauthorized("Missing authentication token"))?;
    state.session_service.logout(token).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(auth: Authenticated) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: auth.0.user_id.clone(),
        email: auth.0.email.clone(),
        name: auth.0.name.clone(),
        roles: auth.0.roles.clone(),
    })
}

/// Create auth router
pub fn auth_router(state: AuthApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(logout))
        .routes(routes!(me))
        .with_state(state)
}

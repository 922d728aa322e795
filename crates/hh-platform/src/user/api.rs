//! Users Admin API
//!
//! REST endpoints for user lifecycle and role assignment.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{IntoParams, ToSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::role::registry::permissions;
use crate::shared::api_common::{PaginatedResponse, PaginationParams, SuccessResponse};
use crate::shared::error::HubError;
use crate::shared::middleware::Authenticated;
use crate::user::entity::User;
use crate::user::service::{CreateUserArgs, SystemService};

/// User response DTO (never exposes the password hash)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    pub roles: Vec<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_photo: user.profile_photo,
            roles: user.roles,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UsersQuery {
    /// Filter by full name (matches first or last name)
    pub full_name: Option<String>,

    /// Filter by role code
    pub role: Option<String>,
}

/// Role assignment request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub role: String,
}

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub system_service: Arc<SystemService>,
}

/// List users with optional filters
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    params(UsersQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated user list", body = PaginatedResponse<UserResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<UsersState>,
    auth: Authenticated,
    Query(query): Query<UsersQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<UserResponse>>, HubError> {
    crate::checks::require_permission(&auth.0, permissions::admin::USER_LIST)?;

    let (users, total) = state
        .system_service
        .list_users(
            query.full_name.as_deref(),
            query.role.as_deref(),
            pagination.offset(),
            pagination.limit(),
        )
        .await?;

    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page(),
        pagination.size(),
        total,
    )))
}

/// Create an administrator
#[utoipa::path(
    post,
    path = "/administrators",
    tag = "users",
    request_body = CreateUserArgs,
    responses(
        (status = 200, description = "Administrator created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Missing permission")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_administrator(
    State(state): State<UsersState>,
    auth: Authenticated,
    Json(args): Json<CreateUserArgs>,
) -> Result<Json<UserResponse>, HubError> {
    crate::checks::require_permission(&auth.0, permissions::admin::USER_CREATE)?;

    let user = state.system_service.create_administrator(args).await?;
    Ok(Json(user.into()))
}

/// Delete an administrator
#[utoipa::path(
    delete,
    path = "/administrators/{id}",
    tag = "users",
    params(("id" = String, Path, description = "Administrator user ID")),
    responses(
        (status = 200, description = "Administrator deleted", body = SuccessResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_administrator(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, HubError> {
    crate::checks::require_permission(&auth.0, permissions::admin::USER_DELETE)?;

    state
        .system_service
        .delete_administrator(&auth.0.user_id, &id)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Create a company owner
#[utoipa::path(
    post,
    path = "/company-owners",
    tag = "users",
    request_body = CreateUserArgs,
    responses(
        (status = 200, description = "Company owner created", body = UserResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_company_owner(
    State(state): State<UsersState>,
    auth: Authenticated,
    Json(args): Json<CreateUserArgs>,
) -> Result<Json<UserResponse>, HubError> {
    crate::checks::require_permission(&auth.0, permissions::admin::USER_CREATE)?;

    let user = state.system_service.create_company_owner(args).await?;
    Ok(Json(user.into()))
}

/// Self-service home-owner registration (anonymous)
#[utoipa::path(
    post,
    path = "/home-owners",
    tag = "users",
    request_body = CreateUserArgs,
    responses(
        (status = 200, description = "Home owner registered", body = UserResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn register_home_owner(
    State(state): State<UsersState>,
    Json(args): Json<CreateUserArgs>,
) -> Result<Json<UserResponse>, HubError> {
    let user = state.system_service.register_home_owner(args).await?;
    Ok(Json(user.into()))
}

/// Assign an additional role to a user
#[utoipa::path(
    patch,
    path = "/{id}/roles",
    tag = "users",
    params(("id" = String, Path, description = "User ID")),
    request_body = AssignRoleRequest,
    responses(
        (status = 200, description = "Role assigned", body = UserResponse),
        (status = 400, description = "Unknown or duplicate role"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_role(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<AssignRoleRequest>,
) -> Result<Json<UserResponse>, HubError> {
    crate::checks::require_permission(&auth.0, permissions::admin::USER_UPDATE)?;

    let user = state.system_service.assign_role(&id, &request.role).await?;
    Ok(Json(user.into()))
}

/// Create users router
pub fn users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_users))
        .routes(routes!(create_administrator))
        .routes(routes!(delete_administrator))
        .routes(routes!(create_company_owner))
        .routes(routes!(register_home_owner))
        .routes(routes!(assign_role))
        .with_state(state)
}

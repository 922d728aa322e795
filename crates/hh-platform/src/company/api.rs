//! Companies API

use axum::{
    extract::{Query, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{IntoParams, ToSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::company::entity::Company;
use crate::company::service::{CompanyService, CreateCompanyArgs};
use crate::role::registry::permissions;
use crate::shared::api_common::{PaginatedResponse, PaginationParams};
use crate::shared::error::HubError;
use crate::shared::middleware::Authenticated;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: String,
    pub name: String,
    pub logo_url: String,
    pub rut: String,
    pub owner_id: String,
    pub owner_name: String,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            id: company.id,
            name: company.name,
            logo_url: company.logo_url,
            rut: company.rut,
            owner_id: company.owner_id,
            owner_name: company.owner_name,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CompaniesQuery {
    /// Filter by company name
    pub name: Option<String>,

    /// Filter by owner full name
    pub owner_name: Option<String>,
}

#[derive(Clone)]
pub struct CompaniesState {
    pub company_service: Arc<CompanyService>,
}

/// List companies with optional filters
#[utoipa::path(
    get,
    path = "",
    tag = "companies",
    params(CompaniesQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated company list", body = PaginatedResponse<CompanyResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_companies(
    State(state): State<CompaniesState>,
    auth: Authenticated,
    Query(query): Query<CompaniesQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<CompanyResponse>>, HubError> {
    crate::checks::require_permission(&auth.0, permissions::admin::COMPANY_LIST)?;

    let (companies, total) = state
        .company_service
        .list_companies(
            query.name.as_deref(),
            query.owner_name.as_deref(),
            pagination.offset(),
            pagination.limit(),
        )
        .await?;

    let data = companies.into_iter().map(CompanyResponse::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page(),
        pagination.size(),
        total,
    )))
}

/// Register a company for the authenticated owner
#[utoipa::path(
    post,
    path = "",
    tag = "companies",
    request_body = CreateCompanyArgs,
    responses(
        (status = 200, description = "Company registered", body = CompanyResponse),
        (status = 400, description = "Validation or uniqueness error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_company(
    State(state): State<CompaniesState>,
    auth: Authenticated,
    Json(args): Json<CreateCompanyArgs>,
) -> Result<Json<CompanyResponse>, HubError> {
    crate::checks::require_permission(&auth.0, permissions::company::COMPANY_CREATE)?;

    let company = state.company_service.create_company(&auth.0, args).await?;
    Ok(Json(company.into()))
}

/// Get the authenticated owner's company
#[utoipa::path(
    get,
    path = "/mine",
    tag = "companies",
    responses(
        (status = 200, description = "The caller's company", body = CompanyResponse),
        (status = 404, description = "Company not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_company(
    State(state): State<CompaniesState>,
    auth: Authenticated,
) -> Result<Json<CompanyResponse>, HubError> {
    let company = state.company_service.get_company_by_owner(&auth.0.user_id).await?;
    Ok(Json(company.into()))
}

/// Create companies router
pub fn companies_router(state: CompaniesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_companies, create_company))
        .routes(routes!(get_my_company))
        .with_state(state)
}

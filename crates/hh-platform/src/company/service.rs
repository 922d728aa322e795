//! Company Service
//!
//! Company registration and lookup with uniqueness checks.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::company::entity::Company;
use crate::company::repository::CompanyRepository;
use crate::shared::authorization_service::AuthContext;
use crate::shared::error::{HubError, Result};

/// RUT shape: 6-8 digits, dash, verifier digit or K
fn rut_pattern() -> &'static regex::Regex {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| regex::Regex::new(r"^\d{6,8}-[\dkK]$").unwrap())
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyArgs {
    pub name: String,
    pub logo_url: String,
    pub rut: String,
}

pub struct CompanyService {
    company_repo: Arc<CompanyRepository>,
}

impl CompanyService {
    pub fn new(company_repo: Arc<CompanyRepository>) -> Self {
        Self { company_repo }
    }

    /// Register a company for the calling owner. Name, logo, and RUT must all
    /// be unique, and an owner may register at most one company.
    pub async fn create_company(&self, owner: &AuthContext, args: CreateCompanyArgs) -> Result<Company> {
        let name = args.name.trim();
        let logo_url = args.logo_url.trim();
        let rut = args.rut.trim();

        if name.is_empty() || logo_url.is_empty() || rut.is_empty() {
            return Err(HubError::validation("Name, logo and RUT are required"));
        }
        if !rut_pattern().is_match(rut) {
            return Err(HubError::validation("Invalid RUT format"));
        }

        if self.company_repo.find_by_owner(&owner.user_id).await?.is_some() {
            return Err(HubError::validation("User already has a company"));
        }
        if self.company_repo.exists_by_name(name).await? {
            return Err(HubError::validation("A company with this name already exists"));
        }
        if self.company_repo.exists_by_logo(logo_url).await? {
            return Err(HubError::validation("A company with this logo already exists"));
        }
        if self.company_repo.exists_by_rut(rut).await? {
            return Err(HubError::validation("A company with this RUT already exists"));
        }

        let company = Company::new(name, logo_url, rut, &owner.user_id, &owner.name);
        self.company_repo.insert(&company).await?;
        info!(company_id = %company.id, owner_id = %owner.user_id, "Company registered");
        Ok(company)
    }

    pub async fn list_companies(
        &self,
        name: Option<&str>,
        owner_name: Option<&str>,
        skip: u64,
        limit: i64,
    ) -> Result<(Vec<Company>, u64)> {
        let companies = self.company_repo.search(name, owner_name, skip, limit).await?;
        let total = self.company_repo.count_with_filters(name, owner_name).await?;
        Ok((companies, total))
    }

    /// The company the given user owns, 404 when none.
    pub async fn get_company_by_owner(&self, owner_id: &str) -> Result<Company> {
        self.company_repo
            .find_by_owner(owner_id)
            .await?
            .ok_or_else(|| HubError::not_found("Company not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rut_pattern() {
        assert!(rut_pattern().is_match("1234567-8"));
        assert!(rut_pattern().is_match("12345678-K"));
        assert!(rut_pattern().is_match("123456-k"));
        assert!(!rut_pattern().is_match("12345-8"));
        assert!(!rut_pattern().is_match("1234567-88"));
        assert!(!rut_pattern().is_match("1234567"));
    }
}

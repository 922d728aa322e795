//! System Service
//!
//! User lifecycle: administrators, company owners, home owners, role
//! assignment, and lookup.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::password_service::PasswordService;
use crate::role::registry::{roles, RoleRegistry};
use crate::shared::error::{HubError, Result};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

/// Email validation pattern
fn email_pattern() -> &'static regex::Regex {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| {
        regex::Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
    })
}

/// Arguments for creating any user
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserArgs {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

pub struct SystemService {
    user_repo: Arc<UserRepository>,
    password_service: Arc<PasswordService>,
    registry: Arc<RoleRegistry>,
}

impl SystemService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        password_service: Arc<PasswordService>,
        registry: Arc<RoleRegistry>,
    ) -> Self {
        Self {
            user_repo,
            password_service,
            registry,
        }
    }

    /// Create an administrator account.
    pub async fn create_administrator(&self, args: CreateUserArgs) -> Result<User> {
        let user = self.create_user(args, roles::ADMINISTRATOR).await?;
        info!(user_id = %user.id, "Administrator created");
        Ok(user)
    }

    /// Delete an administrator. The only hard-delete in the system.
    pub async fn delete_administrator(&self, requester_id: &str, target_id: &str) -> Result<()> {
        if requester_id == target_id {
            return Err(HubError::validation("An administrator cannot delete itself"));
        }

        let target = self
            .user_repo
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| HubError::not_found("User not found"))?;

        if !target.has_role(roles::ADMINISTRATOR) {
            return Err(HubError::validation("User is not an administrator"));
        }

        self.user_repo.delete(target_id).await?;
        info!(user_id = %target_id, "Administrator deleted");
        Ok(())
    }

    /// Create a company-owner account.
    pub async fn create_company_owner(&self, args: CreateUserArgs) -> Result<User> {
        let user = self.create_user(args, roles::COMPANY_OWNER).await?;
        info!(user_id = %user.id, "Company owner created");
        Ok(user)
    }

    /// Self-service home-owner registration. A profile photo is required.
    pub async fn register_home_owner(&self, args: CreateUserArgs) -> Result<User> {
        if args.profile_photo.as_deref().map_or(true, str::is_empty) {
            return Err(HubError::validation("Profile photo is required"));
        }
        let user = self.create_user(args, roles::HOME_OWNER).await?;
        info!(user_id = %user.id, "Home owner registered");
        Ok(user)
    }

    /// Paginated user listing with optional full-name and role filters.
    pub async fn list_users(
        &self,
        full_name: Option<&str>,
        role: Option<&str>,
        skip: u64,
        limit: i64,
    ) -> Result<(Vec<User>, u64)> {
        let users = self.user_repo.search(full_name, role, skip, limit).await?;
        let total = self.user_repo.count_with_filters(full_name, role).await?;
        Ok((users, total))
    }

    pub async fn get_user(&self, id: &str) -> Result<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| HubError::not_found("User not found"))
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| HubError::not_found("User not found"))
    }

    /// Assign an additional registry role to a user.
    pub async fn assign_role(&self, user_id: &str, role_code: &str) -> Result<User> {
        if !self.registry.contains(role_code) {
            return Err(HubError::validation(format!("Unknown role: {}", role_code)));
        }

        let mut user = self.get_user(user_id).await?;
        if user.has_role(role_code) {
            return Err(HubError::validation("User already has this role"));
        }

        user.assign_role(role_code);
        self.user_repo.update(&user).await?;
        info!(user_id = %user.id, role = %role_code, "Role assigned");
        Ok(user)
    }

    async fn create_user(&self, args: CreateUserArgs, role: &str) -> Result<User> {
        let email = args.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(HubError::validation("Email address is required"));
        }
        if !email_pattern().is_match(&email) {
            return Err(HubError::validation("Invalid email address format"));
        }

        let first_name = args.first_name.trim();
        let last_name = args.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(HubError::validation("First name and last name are required"));
        }

        if self.user_repo.exists_by_email(&email).await? {
            return Err(HubError::validation(format!(
                "A user with email '{}' already exists",
                email
            )));
        }

        let password_hash = self.password_service.hash_password(&args.password)?;

        let mut user = User::new(email, password_hash, first_name, last_name).with_role(role);
        if let Some(photo) = args.profile_photo.as_deref().filter(|p| !p.is_empty()) {
            user = user.with_profile_photo(photo);
        }

        self.user_repo.insert(&user).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        assert!(email_pattern().is_match("user@example.com"));
        assert!(email_pattern().is_match("user.name@example.co.uk"));
        assert!(!email_pattern().is_match("invalid"));
        assert!(!email_pattern().is_match("@example.com"));
        assert!(!email_pattern().is_match("user@"));
    }
}

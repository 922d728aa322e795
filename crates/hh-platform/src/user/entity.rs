//! User Entity
//!
//! A user may hold system roles (administrator, company owner, home owner)
//! and independently be a resident of zero or more homes.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Profile photo URL (required for home owners)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,

    /// Role codes resolved against the role registry
    #[serde(default)]
    pub roles: Vec<String>,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            profile_photo: None,
            roles: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn with_profile_photo(mut self, url: impl Into<String>) -> Self {
        self.profile_photo = Some(url.into());
        self
    }

    /// Assign a role; duplicate assignments are ignored.
    pub fn assign_role(&mut self, role: impl Into<String>) {
        let role = role.into();
        if !self.roles.contains(&role) {
            self.roles.push(role);
            self.updated_at = Utc::now();
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_assignment_deduplicates() {
        let mut user = User::new("a@b.com", "hash", "Ana", "Paz");
        user.assign_role("home-owner");
        user.assign_role("home-owner");
        assert_eq!(user.roles.len(), 1);
        assert!(user.has_role("home-owner"));
    }

    #[test]
    fn test_display_name() {
        let user = User::new("a@b.com", "hash", "Ana", "Paz");
        assert_eq!(user.display_name(), "Ana Paz");
    }
}

//! System Role Registry
//!
//! Enumerated capability registry for global (cross-home) permissions.
//! Home-scoped capabilities are a separate namespace; see
//! [`crate::home::entity::HomePermission`].

use std::collections::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

/// System permissions - format: {area}:{entity}:{action}
pub mod permissions {
    /// Administration permissions
    pub mod admin {
        pub const USER_LIST: &str = "admin:user:list";
        pub const USER_CREATE: &str = "admin:user:create";
        pub const USER_UPDATE: &str = "admin:user:update";
        pub const USER_DELETE: &str = "admin:user:delete";

        pub const COMPANY_LIST: &str = "admin:company:list";

        /// All administration permissions
        pub const ALL: &[&str] = &[
            USER_LIST, USER_CREATE, USER_UPDATE, USER_DELETE,
            COMPANY_LIST,
        ];
    }

    /// Company-owner permissions
    pub mod company {
        pub const COMPANY_CREATE: &str = "company:company:create";
        pub const DEVICE_CREATE: &str = "company:device:create";
        pub const DEVICE_IMPORT: &str = "company:device:import";

        pub const ALL: &[&str] = &[COMPANY_CREATE, DEVICE_CREATE, DEVICE_IMPORT];
    }

    /// Home-owner permissions
    pub mod home {
        pub const HOME_CREATE: &str = "home:home:create";

        pub const ALL: &[&str] = &[HOME_CREATE];
    }

    /// Superuser permission (grants all access)
    pub const ADMIN_ALL: &str = "*:*";
}

/// A code-defined system role: a named bundle of system permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemRole {
    /// Role code (unique, e.g. "administrator")
    pub code: String,

    /// Human-readable display name
    pub display_name: String,

    /// Permissions granted by this role
    pub permissions: HashSet<String>,
}

impl SystemRole {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            permissions: HashSet::new(),
        }
    }

    pub fn with_permissions(mut self, permissions: &[&str]) -> Self {
        for p in permissions {
            self.permissions.insert((*p).to_string());
        }
        self
    }
}

/// Built-in roles
pub mod roles {
    use super::*;

    pub const ADMINISTRATOR: &str = "administrator";
    pub const COMPANY_OWNER: &str = "company-owner";
    pub const HOME_OWNER: &str = "home-owner";

    /// System administrator - user and company administration
    pub fn administrator() -> SystemRole {
        SystemRole::new(ADMINISTRATOR, "Administrator")
            .with_permissions(permissions::admin::ALL)
    }

    /// Company owner - registers a company and its device catalog
    pub fn company_owner() -> SystemRole {
        SystemRole::new(COMPANY_OWNER, "Company Owner")
            .with_permissions(permissions::company::ALL)
    }

    /// Home owner - creates homes and manages residents
    pub fn home_owner() -> SystemRole {
        SystemRole::new(HOME_OWNER, "Home Owner")
            .with_permissions(permissions::home::ALL)
    }

    /// All built-in roles
    pub fn all() -> Vec<SystemRole> {
        vec![administrator(), company_owner(), home_owner()]
    }
}

/// Registry of system roles, built once at startup and injected into the
/// authorization check.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: HashMap<String, SystemRole>,
}

impl RoleRegistry {
    /// Build the registry from the built-in roles.
    pub fn builtin() -> Self {
        let mut roles = HashMap::new();
        for role in roles::all() {
            roles.insert(role.code.clone(), role);
        }
        Self { roles }
    }

    pub fn get(&self, code: &str) -> Option<&SystemRole> {
        self.roles.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.roles.contains_key(code)
    }

    pub fn role_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.roles.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Resolve the union of permissions granted by a set of role codes.
    /// Unknown codes are ignored.
    pub fn resolve_permissions(&self, role_codes: &[String]) -> HashSet<String> {
        let mut out = HashSet::new();
        for code in role_codes {
            if let Some(role) = self.roles.get(code) {
                out.extend(role.permissions.iter().cloned());
            }
        }
        out
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_roles() {
        let registry = RoleRegistry::builtin();
        assert!(registry.contains(roles::ADMINISTRATOR));
        assert!(registry.contains(roles::COMPANY_OWNER));
        assert!(registry.contains(roles::HOME_OWNER));
        assert!(!registry.contains("unknown"));
    }

    #[test]
    fn test_resolve_permissions_union() {
        let registry = RoleRegistry::builtin();
        let perms = registry.resolve_permissions(&[
            roles::COMPANY_OWNER.to_string(),
            roles::HOME_OWNER.to_string(),
        ]);

        assert!(perms.contains(permissions::company::DEVICE_CREATE));
        assert!(perms.contains(permissions::home::HOME_CREATE));
        assert!(!perms.contains(permissions::admin::USER_DELETE));
    }

    #[test]
    fn test_resolve_permissions_ignores_unknown_codes() {
        let registry = RoleRegistry::builtin();
        let perms = registry.resolve_permissions(&["nonsense".to_string()]);
        assert!(perms.is_empty());
    }
}

//! Authorization Service
//!
//! Permission-based access control. System permissions are resolved from the
//! code-defined role registry when the request context is built; home-scoped
//! permission checks live in the home service.

use std::collections::HashSet;
use std::sync::Arc;

use crate::role::registry::{permissions, RoleRegistry};
use crate::shared::error::{HubError, Result};
use crate::user::entity::User;

/// Authorization context for a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: String,

    /// Email
    pub email: String,

    /// Display name
    pub name: String,

    /// Role codes
    pub roles: Vec<String>,

    /// All system permissions (resolved from roles at context build time)
    pub permissions: HashSet<String>,
}

impl AuthContext {
    /// Build a context for a user, resolving permissions from the registry.
    pub fn for_user(user: &User, registry: &RoleRegistry) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            name: user.display_name(),
            roles: user.roles.clone(),
            permissions: registry.resolve_permissions(&user.roles),
        }
    }

    /// Check if this context has a specific system permission
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.permissions.contains(permission) {
            return true;
        }

        // Wildcard matching: "area:*" and superuser "*:*"
        if self.permissions.contains(permissions::ADMIN_ALL) {
            return true;
        }
        if let Some((area, _)) = permission.split_once(':') {
            if self.permissions.contains(&format!("{}:*", area)) {
                return true;
            }
        }

        false
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Authorization service for building contexts and checking permissions
pub struct AuthorizationService {
    registry: Arc<RoleRegistry>,
}

impl AuthorizationService {
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self { registry }
    }

    /// Build an authorization context for an authenticated user
    pub fn build_context(&self, user: &User) -> AuthContext {
        AuthContext::for_user(user, &self.registry)
    }
}

/// Common authorization checks
pub mod checks {
    use super::*;

    /// Require a specific system permission
    pub fn require_permission(context: &AuthContext, permission: &str) -> Result<()> {
        if context.has_permission(permission) {
            Ok(())
        } else {
            Err(HubError::forbidden(format!(
                "Missing permission: {}",
                permission
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::registry::roles;

    fn context_with(permissions: Vec<&str>, roles: Vec<&str>) -> AuthContext {
        AuthContext {
            user_id: "user123".to_string(),
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            roles: roles.into_iter().map(String::from).collect(),
            permissions: permissions.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_direct_permission() {
        let ctx = context_with(vec!["admin:user:list"], vec![roles::ADMINISTRATOR]);
        assert!(ctx.has_permission("admin:user:list"));
        assert!(!ctx.has_permission("admin:user:delete"));
    }

    #[test]
    fn test_wildcard_permission() {
        let ctx = context_with(vec!["admin:*"], vec![]);
        assert!(ctx.has_permission("admin:user:list"));
        assert!(ctx.has_permission("admin:company:list"));
        assert!(!ctx.has_permission("company:device:create"));
    }

    #[test]
    fn test_superuser_permission() {
        let ctx = context_with(vec!["*:*"], vec![]);
        assert!(ctx.has_permission("admin:user:delete"));
        assert!(ctx.has_permission("anything:everything"));
    }

    #[test]
    fn test_context_resolves_registry_permissions() {
        let registry = RoleRegistry::builtin();
        let user = User::new("owner@example.com", "hash", "Ana", "Paz")
            .with_role(roles::HOME_OWNER);
        let ctx = AuthContext::for_user(&user, &registry);

        assert!(ctx.has_role(roles::HOME_OWNER));
        assert!(ctx.has_permission(crate::role::registry::permissions::home::HOME_CREATE));
        assert!(!ctx.has_permission(crate::role::registry::permissions::admin::USER_LIST));
    }
}

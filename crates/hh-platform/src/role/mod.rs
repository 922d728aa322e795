//! System roles and permissions.
//!
//! Roles are code-defined and loaded at process start; there is no role
//! collection in the store. Authorization checks resolve a user's role codes
//! against this registry.

pub mod registry;

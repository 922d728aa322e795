//! HomeHub Platform
//!
//! Smart-home management backend: system user administration, device
//! companies and their catalogs, homes with residents and installed
//! hardware, and notification fan-out for simulated hardware events.

pub mod auth;
pub mod company;
pub mod device;
pub mod home;
pub mod notification;
pub mod role;
pub mod seed;
pub mod shared;
pub mod user;

pub use shared::authorization_service::{checks, AuthContext, AuthorizationService};
pub use shared::error::{ErrorResponse, HubError, Result};
pub use shared::middleware::{AppState, AuthLayer, Authenticated};
pub use shared::tsid::TsidGenerator;

pub use role::registry::{permissions, roles, RoleRegistry, SystemRole};

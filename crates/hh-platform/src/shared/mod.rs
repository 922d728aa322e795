pub mod api_common;
pub mod authorization_service;
pub mod error;
pub mod middleware;
pub mod tsid;

pub mod api;
pub mod password_service;
pub mod session;
pub mod session_repository;
pub mod session_service;

pub mod api;
pub mod entity;
pub mod import;
pub mod repository;
pub mod service;

//! Shared infrastructure for HomeHub binaries.

pub mod logging;

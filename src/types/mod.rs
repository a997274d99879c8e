//! Shared types for evalcache.

pub mod config;
pub mod errors;
pub mod evaluation;
pub mod orders;

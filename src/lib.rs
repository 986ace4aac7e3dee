//! Pawboard: list, selection and moderation engine for the admin console of
//! an animal-welfare platform, plus the adapters that talk to its admin API.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

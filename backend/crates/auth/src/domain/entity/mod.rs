//! Entities

pub mod auth;
pub mod refresh_token;
pub mod user;

//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{auth::Auth, refresh_token::RefreshToken, user::User};
pub use repository::{AuthRepository, RefreshTokenRepository, UserRepository};

//! Value Object Module

pub mod email;
pub mod user_name;
pub mod user_password;
pub mod user_role;
pub mod user_status;

/// Auth users are keyed by the shared kernel ID type
pub use kernel::id::UserId;

//! Application Layer
//!
//! Use cases and application services.

pub mod bootstrap_admin;
pub mod config;
pub mod current_user;
pub mod refresh;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod token;

// Re-exports
pub use bootstrap_admin::{BootstrapAdminInput, BootstrapAdminUseCase};
pub use config::AuthConfig;
pub use current_user::CurrentUserUseCase;
pub use refresh::{RefreshOutput, RefreshUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use token::{Claims, TokenPair, TokenService, TokenType};

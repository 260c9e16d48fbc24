//! Storefront accounts and JWT sessions
//!
//! Layers: `domain` (entities, value objects, repository traits),
//! `application` (use cases, token service), `infra` (PostgreSQL and
//! in-memory stores) and `presentation` (handlers, role gate, router).
//!
//! ## Features
//! - Sign-up with user name, email and password
//! - Sign-in by user name or email, issuing a JWT access/refresh pair
//! - Refresh token rotation with reuse detection
//! - Role-based access (Customer, Staff, Admin) via `Authorized<Policy>`
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Access and refresh tokens signed with separate HS256 secrets
//! - Refresh token delivered as an HttpOnly, SameSite=Strict cookie
//! - Automatic lockout after repeated failed sign-ins

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use application::config::AuthConfig;
pub use application::token::TokenService;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::guard::{
    Administrators, AnyUser, Authorized, CatalogManagers, CustomersOnly, Principal, RolePolicy,
};
pub use presentation::middleware::attach_principal;
pub use presentation::router::auth_router;

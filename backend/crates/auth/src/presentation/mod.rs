//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, bearer middleware and role guards.

pub mod dto;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use guard::{
    Administrators, AnyUser, Authorized, CatalogManagers, CustomersOnly, Principal, RolePolicy,
};
pub use handlers::AuthAppState;
pub use middleware::attach_principal;
pub use router::{auth_router, auth_router_generic};

//! Presentation Layer
//!
//! HTTP handlers, DTOs and the router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::{CommerceAppState, CommerceRepository};
pub use router::{commerce_router, commerce_router_generic};

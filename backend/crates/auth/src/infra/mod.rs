//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgAuthRepository;

//! Infrastructure Layer
//!
//! PostgreSQL repository and the on-disk image store.

pub mod image_store;
#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use image_store::DiskImageStore;
pub use postgres::PgCommerceRepository;

//! HTTP Handlers
//!
//! Every handler declares its role gate as an `Authorized<Policy>`
//! extractor, so a rejected caller never reaches the service or the list
//! query.

pub mod customers;
pub mod orders;
pub mod products;

use std::sync::Arc;

use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use kernel::error::app_error::AppError;
use listing::ListParams;

use crate::application::config::CommerceConfig;
use crate::domain::repository::{CustomerRepository, OrderRepository, ProductRepository};
use crate::infra::image_store::DiskImageStore;

/// Every repository the commerce routes need, in one store
pub trait CommerceRepository:
    ProductRepository + CustomerRepository + OrderRepository + Clone + Send + Sync + 'static
{
}

impl<T> CommerceRepository for T where
    T: ProductRepository + CustomerRepository + OrderRepository + Clone + Send + Sync + 'static
{
}

/// Shared state for commerce handlers
#[derive(Clone)]
pub struct CommerceAppState<R>
where
    R: CommerceRepository,
{
    pub repo: Arc<R>,
    pub images: Arc<DiskImageStore>,
    pub config: Arc<CommerceConfig>,
}

/// Query string as raw list parameters
fn list_params(params: Result<Query<ListParams>, QueryRejection>) -> Result<ListParams, AppError> {
    let Query(params) = params.map_err(AppError::from)?;
    Ok(params)
}

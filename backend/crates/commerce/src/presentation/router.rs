//! Commerce Router

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use std::sync::Arc;

use crate::application::config::CommerceConfig;
use crate::infra::image_store::DiskImageStore;
use crate::infra::postgres::PgCommerceRepository;
use crate::presentation::handlers::{
    CommerceAppState, CommerceRepository, customers, orders, products,
};

/// Room for multipart boundaries and headers around the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the Commerce router with PostgreSQL repository
pub fn commerce_router(repo: PgCommerceRepository, config: CommerceConfig) -> Router {
    commerce_router_generic(repo, config)
}

/// Create a generic Commerce router for any repository implementation
pub fn commerce_router_generic<R: CommerceRepository>(repo: R, config: CommerceConfig) -> Router {
    let image_limit = config.upload.max_bytes.saturating_add(MULTIPART_OVERHEAD);
    let state = CommerceAppState {
        repo: Arc::new(repo),
        images: Arc::new(DiskImageStore::from_config(&config)),
        config: Arc::new(config),
    };

    Router::new()
        .route(
            "/products",
            get(products::list_products::<R>).post(products::create_product::<R>),
        )
        .route(
            "/products/{id}",
            get(products::get_product::<R>)
                .put(products::update_product::<R>)
                .delete(products::delete_product::<R>),
        )
        .route(
            "/products/{id}/image",
            post(products::upload_product_image::<R>).layer(DefaultBodyLimit::max(image_limit)),
        )
        .route(
            "/orders",
            get(orders::list_orders::<R>).post(orders::place_order::<R>),
        )
        .route("/orders/mine", get(orders::list_my_orders::<R>))
        .route(
            "/orders/{id}",
            get(orders::get_order::<R>).delete(orders::delete_order::<R>),
        )
        .route("/orders/{id}/status", patch(orders::change_order_status::<R>))
        .route("/orders/{id}/cancel", post(orders::cancel_order::<R>))
        .route("/customers", get(customers::list_customers::<R>))
        .route(
            "/customers/me",
            get(customers::get_my_profile::<R>).put(customers::save_my_profile::<R>),
        )
        .route(
            "/customers/{id}",
            get(customers::get_customer::<R>).delete(customers::delete_customer::<R>),
        )
        .route(
            "/customers/{id}/status",
            patch(customers::set_customer_status::<R>),
        )
        .with_state(state)
}

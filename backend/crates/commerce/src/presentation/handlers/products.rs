//! Product handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use auth::{Authorized, CatalogManagers, Principal, RolePolicy};
use kernel::error::app_error::AppError;
use listing::{ListEnvelope, ListParams};
use platform::upload::validate_image;

use super::{CommerceAppState, CommerceRepository, list_params};
use crate::application::lists::PRODUCTS;
use crate::application::{CatalogService, CatalogView};
use crate::domain::value_object::ProductId;
use crate::error::CommerceResult;
use crate::presentation::dto::{ProductRequest, ProductResponse};

/// Multipart field carrying the file
const IMAGE_FIELD: &str = "image";

/// Staff and admins see every status, everyone else the storefront
fn view_for(principal: Option<Extension<Principal>>) -> CatalogView {
    match principal {
        Some(Extension(p)) if CatalogManagers::allows(p.role) => CatalogView::Backoffice,
        _ => CatalogView::Storefront,
    }
}

/// GET /api/products
pub async fn list_products<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    principal: Option<Extension<Principal>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> CommerceResult<Json<ListEnvelope<ProductResponse>>> {
    let params = list_params(params)?;

    let service = CatalogService::new(state.repo.clone());
    let page = service.list(&params, view_for(principal)).await?;

    Ok(Json(ListEnvelope::new(
        &PRODUCTS,
        page.map(ProductResponse::from),
    )))
}

/// GET /api/products/{id}
pub async fn get_product<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    principal: Option<Extension<Principal>>,
    Path(id): Path<String>,
) -> CommerceResult<Json<ProductResponse>> {
    let product_id = ProductId::parse(&id)?;

    let service = CatalogService::new(state.repo.clone());
    let product = service.get(&product_id, view_for(principal)).await?;

    Ok(Json(product.into()))
}

/// POST /api/products
pub async fn create_product<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<CatalogManagers>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> CommerceResult<impl IntoResponse> {
    let Json(req) = payload.map_err(AppError::from)?;

    let service = CatalogService::new(state.repo.clone());
    let product = service.create(req.into()).await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// PUT /api/products/{id}
pub async fn update_product<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<CatalogManagers>,
    Path(id): Path<String>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> CommerceResult<Json<ProductResponse>> {
    let product_id = ProductId::parse(&id)?;
    let Json(req) = payload.map_err(AppError::from)?;

    let service = CatalogService::new(state.repo.clone());
    let product = service.update(&product_id, req.into()).await?;

    Ok(Json(product.into()))
}

/// DELETE /api/products/{id}
pub async fn delete_product<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<CatalogManagers>,
    Path(id): Path<String>,
) -> CommerceResult<StatusCode> {
    let product_id = ProductId::parse(&id)?;

    CatalogService::new(state.repo.clone())
        .delete(&product_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/products/{id}/image
///
/// `multipart/form-data` with one `image` part. Other parts are ignored.
pub async fn upload_product_image<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<CatalogManagers>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> CommerceResult<Json<ProductResponse>> {
    let product_id = ProductId::parse(&id)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(AppError::from)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(AppError::from)?;
        upload = Some((content_type, file_name, bytes));
        break;
    }

    let (content_type, file_name, bytes) = upload.ok_or_else(|| {
        AppError::bad_request("Missing image file")
            .with_param(IMAGE_FIELD)
            .with_action("Send the file as the `image` part of a multipart form")
    })?;

    let image = validate_image(
        &state.config.upload,
        content_type.as_deref(),
        file_name.as_deref(),
        &bytes,
    )?;

    let service = CatalogService::new(state.repo.clone());
    let product = service
        .attach_image(&product_id, &image, &bytes, state.images.as_ref())
        .await?;

    Ok(Json(product.into()))
}

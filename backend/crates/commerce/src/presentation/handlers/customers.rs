//! Customer handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use auth::{Administrators, Authorized, CustomersOnly};
use kernel::error::app_error::AppError;
use listing::{ListEnvelope, ListParams};

use super::{CommerceAppState, CommerceRepository, list_params};
use crate::application::CustomerService;
use crate::application::lists::CUSTOMERS;
use crate::domain::value_object::CustomerId;
use crate::error::CommerceResult;
use crate::presentation::dto::{CustomerProfileRequest, CustomerResponse, CustomerStatusRequest};

/// GET /api/customers
pub async fn list_customers<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<Administrators>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> CommerceResult<Json<ListEnvelope<CustomerResponse>>> {
    let params = list_params(params)?;

    let page = CustomerService::new(state.repo.clone())
        .list(&params)
        .await?;

    Ok(Json(ListEnvelope::new(
        &CUSTOMERS,
        page.map(CustomerResponse::from),
    )))
}

/// GET /api/customers/me
pub async fn get_my_profile<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    caller: Authorized<CustomersOnly>,
) -> CommerceResult<Json<CustomerResponse>> {
    let customer = CustomerService::new(state.repo.clone())
        .get_own(caller.user_id)
        .await?;

    Ok(Json(customer.into()))
}

/// PUT /api/customers/me
///
/// 201 when the profile is created, 200 when replaced.
pub async fn save_my_profile<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    caller: Authorized<CustomersOnly>,
    payload: Result<Json<CustomerProfileRequest>, JsonRejection>,
) -> CommerceResult<impl IntoResponse> {
    let Json(req) = payload.map_err(AppError::from)?;

    let (customer, created) = CustomerService::new(state.repo.clone())
        .save_own(caller.user_id, req.into())
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(CustomerResponse::from(customer))))
}

/// GET /api/customers/{id}
pub async fn get_customer<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<Administrators>,
    Path(id): Path<String>,
) -> CommerceResult<Json<CustomerResponse>> {
    let customer_id = CustomerId::parse(&id)?;

    let customer = CustomerService::new(state.repo.clone())
        .get(&customer_id)
        .await?;

    Ok(Json(customer.into()))
}

/// PATCH /api/customers/{id}/status
pub async fn set_customer_status<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<Administrators>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerStatusRequest>, JsonRejection>,
) -> CommerceResult<Json<CustomerResponse>> {
    let customer_id = CustomerId::parse(&id)?;
    let Json(req) = payload.map_err(AppError::from)?;

    let customer = CustomerService::new(state.repo.clone())
        .set_status(&customer_id, req.status)
        .await?;

    Ok(Json(customer.into()))
}

/// DELETE /api/customers/{id}
pub async fn delete_customer<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<Administrators>,
    Path(id): Path<String>,
) -> CommerceResult<StatusCode> {
    let customer_id = CustomerId::parse(&id)?;

    CustomerService::new(state.repo.clone())
        .delete(&customer_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

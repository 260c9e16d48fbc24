//! Order handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use auth::{Administrators, AnyUser, Authorized, CustomersOnly};
use kernel::error::app_error::AppError;
use listing::{ListEnvelope, ListParams};

use super::{CommerceAppState, CommerceRepository, list_params};
use crate::application::OrderService;
use crate::application::lists::{MY_ORDERS, ORDERS};
use crate::domain::value_object::OrderId;
use crate::error::CommerceResult;
use crate::presentation::dto::{OrderResponse, OrderStatusRequest, PlaceOrderRequest};

/// GET /api/orders
pub async fn list_orders<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<Administrators>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> CommerceResult<Json<ListEnvelope<OrderResponse>>> {
    let params = list_params(params)?;

    let page = OrderService::new(state.repo.clone())
        .list_all(&params)
        .await?;

    Ok(Json(ListEnvelope::new(&ORDERS, page.map(OrderResponse::from))))
}

/// GET /api/orders/mine
pub async fn list_my_orders<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    caller: Authorized<CustomersOnly>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> CommerceResult<Json<ListEnvelope<OrderResponse>>> {
    let params = list_params(params)?;

    let page = OrderService::new(state.repo.clone())
        .list_mine(&caller, &params)
        .await?;

    Ok(Json(ListEnvelope::new(
        &MY_ORDERS,
        page.map(OrderResponse::from),
    )))
}

/// POST /api/orders
pub async fn place_order<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    caller: Authorized<CustomersOnly>,
    payload: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> CommerceResult<impl IntoResponse> {
    let Json(req) = payload.map_err(AppError::from)?;

    let order = OrderService::new(state.repo.clone())
        .place(&caller, req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// GET /api/orders/{id}
pub async fn get_order<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    caller: Authorized<AnyUser>,
    Path(id): Path<String>,
) -> CommerceResult<Json<OrderResponse>> {
    let order_id = OrderId::parse(&id)?;

    let order = OrderService::new(state.repo.clone())
        .get(&caller, &order_id)
        .await?;

    Ok(Json(order.into()))
}

/// PATCH /api/orders/{id}/status
pub async fn change_order_status<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<Administrators>,
    Path(id): Path<String>,
    payload: Result<Json<OrderStatusRequest>, JsonRejection>,
) -> CommerceResult<Json<OrderResponse>> {
    let order_id = OrderId::parse(&id)?;
    let Json(req) = payload.map_err(AppError::from)?;

    let order = OrderService::new(state.repo.clone())
        .change_status(&order_id, req.status)
        .await?;

    Ok(Json(order.into()))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel_order<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    caller: Authorized<AnyUser>,
    Path(id): Path<String>,
) -> CommerceResult<Json<OrderResponse>> {
    let order_id = OrderId::parse(&id)?;

    let order = OrderService::new(state.repo.clone())
        .cancel(&caller, &order_id)
        .await?;

    Ok(Json(order.into()))
}

/// DELETE /api/orders/{id}
pub async fn delete_order<R: CommerceRepository>(
    State(state): State<CommerceAppState<R>>,
    _gate: Authorized<Administrators>,
    Path(id): Path<String>,
) -> CommerceResult<StatusCode> {
    let order_id = OrderId::parse(&id)?;

    OrderService::new(state.repo.clone())
        .delete(&order_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

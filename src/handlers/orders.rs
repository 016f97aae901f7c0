//! Checkout and order routes.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::interfaces::{NewOrder, OrderStatus};
use crate::orders::Order;

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order_code: String,
    pub transaction_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckOrderParams {
    pub code: Option<String>,
}

pub async fn checkout(
    State(state): State<AppState>,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let Json(order) = payload?;
    let receipt = state.orders.checkout(order).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: "Transaction successful".to_string(),
            order_code: receipt.order_code,
            transaction_id: receipt.transaction_id,
        }),
    ))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.list_orders().await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let Json(update) = payload?;
    let status = OrderStatus::try_from(update.status)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state.orders.update_status(id, status).await?;
    Ok(Json(json!({ "message": "Status updated successfully" })))
}

pub async fn check_order(
    State(state): State<AppState>,
    Query(params): Query<CheckOrderParams>,
) -> Result<Json<Order>, ApiError> {
    let code = params.code.unwrap_or_default();
    if code.trim().is_empty() {
        return Err(ApiError::BadRequest("order code is required".to_string()));
    }
    Ok(Json(state.orders.find_by_code(code.trim()).await?))
}

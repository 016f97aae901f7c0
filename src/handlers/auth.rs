//! Login route.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::{ApiError, AppState};
use crate::auth::{LoginRequest, LoginResponse};

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.auth.login(&request).await?))
}

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::common::data_response;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub order_id: i64,
    #[validate(length(min = 1, max = 32))]
    pub payment_method: String,
    #[validate(length(max = 16))]
    pub bank_code: Option<String>,
}

async fn create_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let payment = state
        .services
        .payments
        .create_payment(
            user.id,
            payload.order_id,
            &payload.payment_method,
            payload.bank_code.as_deref(),
        )
        .await?;
    Ok(data_response(payment))
}

/// Unlike the rest of the API this endpoint answers `{paid, status}` at the
/// top level; polling clients read the body directly.
async fn payment_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = state.services.payments.get_payment_status(user.id, id).await?;
    Ok(Json(status))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments/create", post(create_payment))
        .route("/payments/:id/status", get(payment_status))
}

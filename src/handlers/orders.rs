use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::common::{data_response, message_response};
use crate::services::orders::{CheckoutInput, DeliveryMethod, OrderStatusFilter, PaymentMethod};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub product_id: i64,
    #[validate(range(min = 1))]
    pub qty: i64,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
}

async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let receipt = state
        .services
        .orders
        .checkout(
            user.id,
            CheckoutInput {
                product_id: payload.product_id,
                qty: payload.qty,
                payment_method: payload.payment_method,
                delivery_method: payload.delivery_method,
                address: payload.address,
                note: payload.note,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, data_response(receipt)))
}

async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = OrderStatusFilter::parse(query.status.as_deref())?;
    let orders = state.services.orders.list_orders(user.id, filter).await?;
    Ok(data_response(orders))
}

async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.confirm_payment(user.id, id).await?;
    Ok(message_response("Payment confirmed"))
}

async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.cancel_order(user.id, id).await?;
    Ok(message_response("Order canceled"))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/orders", get(list_orders))
        .route("/orders/:id/confirm-payment", post(confirm_payment))
        .route("/orders/:id/cancel", post(cancel_order))
}

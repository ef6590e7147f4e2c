use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::common::{data_response, message_response};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AddCartRequest {
    pub product_id: i64,
    #[validate(range(min = 1))]
    pub qty: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartRequest {
    #[validate(range(min = 1))]
    pub qty: i64,
}

async fn list_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.cart.list(user.id).await?;
    Ok(data_response(items))
}

async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddCartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    state
        .services
        .cart
        .add(user.id, payload.product_id, payload.qty)
        .await?;
    Ok((StatusCode::CREATED, message_response("Added to cart")))
}

async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    state
        .services
        .cart
        .update_item(user.id, id, payload.qty)
        .await?;
    Ok(message_response("Cart updated"))
}

async fn remove_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.cart.remove_item(user.id, id).await?;
    Ok(message_response("Removed from cart"))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(list_cart))
        .route("/cart/add", post(add_to_cart))
        .route(
            "/cart/item/:id",
            patch(update_cart_item).delete(remove_cart_item),
        )
}

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::common::data_response;
use crate::AppState;
use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AddAddressRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1, max = 500))]
    pub detail: String,
    #[serde(default)]
    pub is_primary: bool,
}

async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let addresses = state.services.addresses.list(user.id).await?;
    Ok(data_response(addresses))
}

async fn add_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddAddressRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let address = state
        .services
        .addresses
        .add(user.id, &payload.title, &payload.detail, payload.is_primary)
        .await?;
    Ok((StatusCode::CREATED, data_response(address)))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/addresses", get(list_addresses).post(add_address))
}

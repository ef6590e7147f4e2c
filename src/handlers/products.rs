use crate::errors::ServiceError;
use crate::handlers::common::data_response;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state
        .services
        .catalog
        .list_products(query.category.as_deref(), query.q.as_deref())
        .await?;
    Ok(data_response(products))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.catalog.get_product(id).await?;
    Ok(data_response(product))
}

async fn list_promos(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let promos = state.services.catalog.list_promos().await?;
    Ok(data_response(promos))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/promos", get(list_promos))
}

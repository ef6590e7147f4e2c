use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::handlers::common::{data_response, message_response};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub product_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub product_id: i64,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let reviews = state
        .services
        .reviews
        .list_for_product(query.product_id)
        .await?;
    Ok(data_response(reviews))
}

async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let review = state
        .services
        .reviews
        .create(user.id, payload.product_id, payload.rating, payload.comment)
        .await?;
    Ok((StatusCode::CREATED, data_response(review)))
}

async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let review = state
        .services
        .reviews
        .update(user.id, id, payload.rating, payload.comment)
        .await?;
    Ok(data_response(review))
}

async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.reviews.delete(user.id, id).await?;
    Ok(message_response("Review deleted"))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ulasan", get(list_reviews).post(create_review))
        .route("/ulasan/:id", patch(update_review).delete(delete_review))
}

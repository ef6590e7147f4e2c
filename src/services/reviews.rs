use crate::entities::{review, Product, Review};
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;

/// Product review (ulasan) CRUD. One review per (user, product); updates
/// and deletes are owner-only.
#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DatabaseConnection>,
}

impl ReviewService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_for_product(
        &self,
        product_id: i64,
    ) -> Result<Vec<review::Model>, ServiceError> {
        Ok(Review::find()
            .filter(review::Column::ProductId.eq(product_id))
            .order_by_desc(review::Column::Id)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, comment))]
    pub async fn create(
        &self,
        user_id: i64,
        product_id: i64,
        rating: i32,
        comment: Option<String>,
    ) -> Result<review::Model, ServiceError> {
        validate_rating(rating)?;

        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))?;

        let existing = Review::find()
            .filter(review::Column::UserId.eq(user_id))
            .filter(review::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "Product already reviewed; update the existing review".into(),
            ));
        }

        let created = review::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            product_id: Set(product_id),
            rating: Set(rating),
            comment: Set(comment),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        Ok(created)
    }

    #[instrument(skip(self, comment))]
    pub async fn update(
        &self,
        user_id: i64,
        review_id: i64,
        rating: Option<i32>,
        comment: Option<String>,
    ) -> Result<review::Model, ServiceError> {
        if let Some(rating) = rating {
            validate_rating(rating)?;
        }
        let row = self.find_owned(user_id, review_id).await?;

        let mut update: review::ActiveModel = row.into();
        if let Some(rating) = rating {
            update.rating = Set(rating);
        }
        if comment.is_some() {
            update.comment = Set(comment);
        }
        update.updated_at = Set(Utc::now());

        Ok(update.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i64, review_id: i64) -> Result<(), ServiceError> {
        let row = self.find_owned(user_id, review_id).await?;
        row.delete(&*self.db).await?;
        Ok(())
    }

    async fn find_owned(
        &self,
        user_id: i64,
        review_id: i64,
    ) -> Result<review::Model, ServiceError> {
        Review::find_by_id(review_id)
            .filter(review::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Review not found".into()))
    }
}

fn validate_rating(rating: i32) -> Result<(), ServiceError> {
    if !(1..=5).contains(&rating) {
        return Err(ServiceError::ValidationError(
            "rating must be between 1 and 5".into(),
        ));
    }
    Ok(())
}

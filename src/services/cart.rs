use crate::entities::{cart_item, product, CartItem, Product};
use crate::errors::ServiceError;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Cart line joined with the product it references.
#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub cart_id: i64,
    pub product_id: i64,
    pub qty: i64,
    pub name: String,
    pub store: String,
    pub price: i64,
    pub promo_price: Option<i64>,
    pub rating: f64,
    pub image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Per-user product -> quantity mapping with upsert-on-add semantics.
/// Ownership is checked before every mutation; the store's unique
/// (user, product) index backs the single-row invariant.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: i64) -> Result<Vec<CartItemView>, ServiceError> {
        let rows: Vec<(cart_item::Model, Option<product::Model>)> = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .find_also_related(Product)
            .order_by_desc(cart_item::Column::Id)
            .all(&*self.db)
            .await?;

        let views = rows
            .into_iter()
            .filter_map(|(item, prod)| {
                prod.map(|p| CartItemView {
                    cart_id: item.id,
                    product_id: item.product_id,
                    qty: item.qty,
                    name: p.name,
                    store: p.store,
                    price: p.price,
                    promo_price: p.promo_price,
                    rating: p.rating,
                    image: p.image,
                    updated_at: item.updated_at,
                })
            })
            .collect();

        Ok(views)
    }

    /// Upsert: an existing (user, product) row has its quantity incremented
    /// and its update timestamp touched; otherwise a new row is inserted.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: i64, product_id: i64, qty: i64) -> Result<(), ServiceError> {
        if qty < 1 {
            return Err(ServiceError::ValidationError(
                "qty must be at least 1".into(),
            ));
        }

        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))?;

        let existing = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?;

        match existing {
            Some(row) => {
                cart_item::ActiveModel {
                    id: Set(row.id),
                    qty: Set(row.qty + qty),
                    updated_at: Set(Utc::now()),
                    ..Default::default()
                }
                .update(&*self.db)
                .await?;
            }
            None => {
                cart_item::ActiveModel {
                    id: NotSet,
                    user_id: Set(user_id),
                    product_id: Set(product_id),
                    qty: Set(qty),
                    created_at: Set(Utc::now()),
                    updated_at: Set(Utc::now()),
                }
                .insert(&*self.db)
                .await?;
            }
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn update_item(
        &self,
        user_id: i64,
        cart_id: i64,
        qty: i64,
    ) -> Result<(), ServiceError> {
        if qty < 1 {
            return Err(ServiceError::ValidationError(
                "qty must be at least 1".into(),
            ));
        }

        let row = self.find_owned(user_id, cart_id).await?;

        cart_item::ActiveModel {
            id: Set(row.id),
            qty: Set(qty),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&*self.db)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: i64, cart_id: i64) -> Result<(), ServiceError> {
        let row = self.find_owned(user_id, cart_id).await?;
        row.delete(&*self.db).await?;
        Ok(())
    }

    async fn find_owned(
        &self,
        user_id: i64,
        cart_id: i64,
    ) -> Result<cart_item::Model, ServiceError> {
        CartItem::find_by_id(cart_id)
            .filter(cart_item::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart item not found".into()))
    }
}

use crate::entities::{product, promo, Product, Promo};
use crate::errors::ServiceError;
use sea_orm::sea_query::{Condition, Expr, Func};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;

/// Category value meaning "all categories" — the storefront sends the
/// sentinel verbatim.
const ALL_CATEGORIES: &str = "Semua";

/// Read-only catalog queries: products with optional category and free-text
/// filtering, and promo banners.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Category matches exactly (case-sensitive) unless it is empty or the
    /// sentinel; the text query matches name or store case-insensitively.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        category: Option<&str>,
        q: Option<&str>,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let mut query = Product::find().order_by_desc(product::Column::Id);

        if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
            if category != ALL_CATEGORIES {
                query = query.filter(product::Column::Category.eq(category));
            }
        }

        if let Some(term) = q.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(product::Column::Name)))
                            .like(pattern.clone()),
                    )
                    .add(Expr::expr(Func::lower(Expr::col(product::Column::Store))).like(pattern)),
            );
        }

        Ok(query.all(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> Result<product::Model, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))
    }

    #[instrument(skip(self))]
    pub async fn list_promos(&self) -> Result<Vec<promo::Model>, ServiceError> {
        Ok(Promo::find()
            .order_by_desc(promo::Column::Id)
            .all(&*self.db)
            .await?)
    }
}

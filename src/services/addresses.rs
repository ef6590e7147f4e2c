use crate::entities::{address, Address};
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;

/// Saved delivery addresses. A user's first address becomes primary no
/// matter what the request says; saving a new primary demotes the rest.
#[derive(Clone)]
pub struct AddressService {
    db: Arc<DatabaseConnection>,
}

impl AddressService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Primary address first, then newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: i64) -> Result<Vec<address::Model>, ServiceError> {
        Ok(Address::find()
            .filter(address::Column::UserId.eq(user_id))
            .order_by_desc(address::Column::IsPrimary)
            .order_by_desc(address::Column::Id)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self, title, detail))]
    pub async fn add(
        &self,
        user_id: i64,
        title: &str,
        detail: &str,
        is_primary: bool,
    ) -> Result<address::Model, ServiceError> {
        let title = title.trim();
        let detail = detail.trim();
        if title.is_empty() || detail.is_empty() {
            return Err(ServiceError::ValidationError(
                "title and detail must not be empty".into(),
            ));
        }

        let existing = Address::find()
            .filter(address::Column::UserId.eq(user_id))
            .count(&*self.db)
            .await?;
        let is_primary = is_primary || existing == 0;

        if is_primary {
            Address::update_many()
                .col_expr(address::Column::IsPrimary, Expr::value(false))
                .filter(address::Column::UserId.eq(user_id))
                .exec(&*self.db)
                .await?;
        }

        let created = address::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            title: Set(title.to_string()),
            detail: Set(detail.to_string()),
            is_primary: Set(is_primary),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        Ok(created)
    }
}

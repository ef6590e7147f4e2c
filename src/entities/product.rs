use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog product. Prices are IDR minor units; `promo_price` overrides
/// `price` only when `0 < promo_price < price`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub category: String,
    pub store: String,
    pub price: i64,
    pub promo_price: Option<i64>,
    pub rating: f64,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Effective unit price after the promotion rule.
    pub fn effective_price(&self) -> i64 {
        match self.promo_price {
            Some(promo) if promo > 0 && promo < self.price => promo,
            _ => self.price,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, promo: Option<i64>) -> Model {
        Model {
            id: 1,
            name: "Nasi Goreng Spesial".into(),
            category: "Makanan".into(),
            store: "Warung Pak Komto".into(),
            price,
            promo_price: promo,
            rating: 4.9,
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn promo_below_list_price_wins() {
        assert_eq!(product(25_000, Some(15_000)).effective_price(), 15_000);
    }

    #[test]
    fn invalid_promos_fall_back_to_list_price() {
        assert_eq!(product(25_000, None).effective_price(), 25_000);
        assert_eq!(product(25_000, Some(0)).effective_price(), 25_000);
        assert_eq!(product(25_000, Some(25_000)).effective_price(), 25_000);
        assert_eq!(product(25_000, Some(30_000)).effective_price(), 25_000);
    }
}

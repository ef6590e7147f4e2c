use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A checkout order. Created together with exactly one order item; gateway
/// fields are written only by the payment service. Orders are never deleted;
/// cancellation is a status transition.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    /// pending -> paid | canceled, or completed. paid/canceled/completed are terminal.
    pub status: String,
    /// pending | paid
    pub payment_status: String,
    /// cash | qris | bank_transfer
    pub payment_method: String,
    /// pickup | delivery
    pub delivery_method: String,
    pub address: String,
    pub note: String,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub payment_url: Option<String>,
    pub payment_token: Option<String>,
    pub payment_qr: Option<String>,
    /// Gateway transaction reference (ORDER-{id}-{millis}); None until a
    /// live charge has been issued.
    pub midtrans_order_id: Option<String>,
    pub bank_code: Option<String>,
    pub va_number: Option<String>,
    pub va_expired_at: Option<String>,
    pub biller_code: Option<String>,
    pub bill_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_PAID: &str = "paid";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELED: &str = "canceled";

use crate::entities::{order, order_item, product, review, Order, OrderItem, Product, Review};
use crate::errors::ServiceError;
use crate::services::payments::PaymentService;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Flat surcharge (IDR minor units) applied when the order is delivered
/// rather than picked up.
pub const DELIVERY_FEE: i64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Qris,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Qris => "qris",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Pickup,
    Delivery,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }
}

/// Order list filter: `processing` covers in-flight orders, `history`
/// covers terminal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatusFilter {
    All,
    Processing,
    History,
}

impl OrderStatusFilter {
    pub fn parse(raw: Option<&str>) -> Result<Self, ServiceError> {
        match raw.unwrap_or("").trim() {
            "" => Ok(Self::All),
            "processing" => Ok(Self::Processing),
            "history" => Ok(Self::History),
            other => Err(ServiceError::ValidationError(format!(
                "Unknown status filter: {}",
                other
            ))),
        }
    }

    fn statuses(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::All => None,
            Self::Processing => Some(&[order::STATUS_PENDING, order::STATUS_PROCESSING]),
            Self::History => Some(&[
                order::STATUS_PAID,
                order::STATUS_COMPLETED,
                order::STATUS_CANCELED,
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutInput {
    pub product_id: i64,
    pub qty: i64,
    pub payment_method: PaymentMethod,
    pub delivery_method: DeliveryMethod,
    pub address: Option<String>,
    pub note: Option<String>,
}

/// What the client gets back from a successful checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutReceipt {
    pub id: i64,
    pub total: i64,
    pub payment_method: &'static str,
    pub delivery_method: &'static str,
    pub payment_url: Option<String>,
    pub payment_token: Option<String>,
    pub payment_qr: Option<String>,
}

/// One row of the order list: the order, its single item snapshot, the
/// product it references and the caller's own star rating if they reviewed
/// that product.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: i64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub delivery_method: String,
    pub address: String,
    pub note: String,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
    pub qty: i64,
    pub price: i64,
    pub promo_price: Option<i64>,
    pub payment_url: Option<String>,
    pub payment_qr: Option<String>,
    pub bank_code: Option<String>,
    pub va_number: Option<String>,
    pub product: Option<OrderProductView>,
    pub my_rating: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct OrderProductView {
    pub id: i64,
    pub name: String,
    pub store: String,
    pub image: Option<String>,
}

/// Converts a (product, qty, payment method, delivery method) selection into
/// a durable order plus one price-snapshot item, pricing authoritatively
/// from the catalog — never from the client.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    payments: Arc<PaymentService>,
}

fn compute_totals(
    unit_price: i64,
    qty: i64,
    delivery: DeliveryMethod,
) -> Result<(i64, i64, i64), ServiceError> {
    let subtotal = unit_price
        .checked_mul(qty)
        .ok_or_else(|| ServiceError::ValidationError("qty is too large".into()))?;
    let delivery_fee = match delivery {
        DeliveryMethod::Delivery => DELIVERY_FEE,
        DeliveryMethod::Pickup => 0,
    };
    let total = subtotal
        .checked_add(delivery_fee)
        .ok_or_else(|| ServiceError::ValidationError("order total is too large".into()))?;
    Ok((subtotal, delivery_fee, total))
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, payments: Arc<PaymentService>) -> Self {
        Self { db, payments }
    }

    /// Checkout: order insert happens-before item insert happens-before the
    /// gateway call happens-before the gateway-field update. There is no
    /// compensation if the gateway call fails after the order committed;
    /// the order stays pending with null gateway fields for reconciliation.
    #[instrument(skip(self, input), fields(product_id = input.product_id))]
    pub async fn checkout(
        &self,
        user_id: i64,
        input: CheckoutInput,
    ) -> Result<CheckoutReceipt, ServiceError> {
        if input.qty < 1 {
            return Err(ServiceError::ValidationError(
                "qty must be at least 1".into(),
            ));
        }

        let product = Product::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".into()))?;

        let unit_price = product.effective_price();
        let (subtotal, delivery_fee, total) =
            compute_totals(unit_price, input.qty, input.delivery_method)?;

        let new_order = order::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            status: Set(order::STATUS_PENDING.to_string()),
            payment_status: Set(order::STATUS_PENDING.to_string()),
            payment_method: Set(input.payment_method.as_str().to_string()),
            delivery_method: Set(input.delivery_method.as_str().to_string()),
            address: Set(input.address.unwrap_or_default().trim().to_string()),
            note: Set(input.note.unwrap_or_default().trim().to_string()),
            subtotal: Set(subtotal),
            delivery_fee: Set(delivery_fee),
            total: Set(total),
            payment_url: Set(None),
            payment_token: Set(None),
            payment_qr: Set(None),
            midtrans_order_id: Set(None),
            bank_code: Set(None),
            va_number: Set(None),
            va_expired_at: Set(None),
            biller_code: Set(None),
            bill_key: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        order_item::ActiveModel {
            id: NotSet,
            order_id: Set(new_order.id),
            product_id: Set(product.id),
            qty: Set(input.qty),
            price: Set(product.price),
            promo_price: Set(product.promo_price),
        }
        .insert(&*self.db)
        .await?;

        let payment = if input.payment_method != PaymentMethod::Cash {
            Some(
                self.payments
                    .create_payment_for_order(
                        new_order.id,
                        total,
                        input.payment_method.as_str(),
                        None,
                        &product.name,
                    )
                    .await?,
            )
        } else {
            None
        };

        info!(order_id = new_order.id, total, "checkout completed");

        Ok(CheckoutReceipt {
            id: new_order.id,
            total,
            payment_method: input.payment_method.as_str(),
            delivery_method: input.delivery_method.as_str(),
            payment_url: payment.as_ref().and_then(|p| p.payment_url.clone()),
            payment_token: payment.as_ref().and_then(|p| p.payment_token.clone()),
            payment_qr: payment.as_ref().and_then(|p| p.payment_qr.clone()),
        })
    }

    /// Marks an owned order paid. Idempotent; re-confirming a paid order is
    /// a no-op success.
    #[instrument(skip(self))]
    pub async fn confirm_payment(&self, user_id: i64, order_id: i64) -> Result<(), ServiceError> {
        let order = self.find_owned(user_id, order_id).await?;

        order::ActiveModel {
            id: Set(order.id),
            status: Set(order::STATUS_PAID.to_string()),
            payment_status: Set(order::STATUS_PAID.to_string()),
            ..Default::default()
        }
        .update(&*self.db)
        .await?;

        Ok(())
    }

    /// Cancels an owned, non-terminal order. Canceling an already-canceled
    /// order succeeds without a write; paid or completed orders cannot be
    /// canceled through this path.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, user_id: i64, order_id: i64) -> Result<(), ServiceError> {
        let order = self.find_owned(user_id, order_id).await?;

        match order.status.as_str() {
            order::STATUS_CANCELED => Ok(()),
            order::STATUS_PAID | order::STATUS_COMPLETED => Err(ServiceError::Conflict(
                "Order already paid and cannot be canceled".into(),
            )),
            _ => {
                order::ActiveModel {
                    id: Set(order.id),
                    status: Set(order::STATUS_CANCELED.to_string()),
                    ..Default::default()
                }
                .update(&*self.db)
                .await?;
                info!(order_id, "order canceled");
                Ok(())
            }
        }
    }

    /// Lists the caller's orders, newest first, joined with each order's
    /// single item, its product, and the caller's review rating for that
    /// product when present.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        user_id: i64,
        filter: OrderStatusFilter,
    ) -> Result<Vec<OrderView>, ServiceError> {
        let mut query = Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::Id);
        if let Some(statuses) = filter.statuses() {
            query = query.filter(order::Column::Status.is_in(statuses.iter().copied()));
        }
        let orders = query.all(&*self.db).await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let items: Vec<(order_item::Model, Option<product::Model>)> = OrderItem::find()
            .filter(order_item::Column::OrderId.is_in(order_ids))
            .find_also_related(Product)
            .all(&*self.db)
            .await?;

        let product_ids: Vec<i64> = items.iter().map(|(item, _)| item.product_id).collect();
        let ratings: HashMap<i64, i32> = Review::find()
            .filter(review::Column::UserId.eq(user_id))
            .filter(review::Column::ProductId.is_in(product_ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|r| (r.product_id, r.rating))
            .collect();

        let mut by_order: HashMap<i64, (order_item::Model, Option<product::Model>)> = items
            .into_iter()
            .map(|(item, prod)| (item.order_id, (item, prod)))
            .collect();

        let views = orders
            .into_iter()
            .map(|o| {
                let entry = by_order.remove(&o.id);
                let (qty, price, promo_price, product, my_rating) = match entry {
                    Some((item, prod)) => {
                        let rating = ratings.get(&item.product_id).copied();
                        (
                            item.qty,
                            item.price,
                            item.promo_price,
                            prod.map(|p| OrderProductView {
                                id: p.id,
                                name: p.name,
                                store: p.store,
                                image: p.image,
                            }),
                            rating,
                        )
                    }
                    None => (0, 0, None, None, None),
                };

                OrderView {
                    id: o.id,
                    status: o.status,
                    payment_status: o.payment_status,
                    payment_method: o.payment_method,
                    delivery_method: o.delivery_method,
                    address: o.address,
                    note: o.note,
                    subtotal: o.subtotal,
                    delivery_fee: o.delivery_fee,
                    total: o.total,
                    qty,
                    price,
                    promo_price,
                    payment_url: o.payment_url,
                    payment_qr: o.payment_qr,
                    bank_code: o.bank_code,
                    va_number: o.va_number,
                    product,
                    my_rating,
                    created_at: o.created_at,
                }
            })
            .collect();

        Ok(views)
    }

    async fn find_owned(&self, user_id: i64, order_id: i64) -> Result<order::Model, ServiceError> {
        Order::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".into()))
    }
}

mod common;

use common::TestApp;
use sea_orm::{EntityTrait, PaginatorTrait};
use warung_api::entities::{Order, OrderItem};
use warung_api::errors::ServiceError;
use warung_api::services::orders::{CheckoutInput, DeliveryMethod, PaymentMethod};

fn checkout_input(product_id: i64, qty: i64) -> CheckoutInput {
    CheckoutInput {
        product_id,
        qty,
        payment_method: PaymentMethod::Cash,
        delivery_method: DeliveryMethod::Delivery,
        address: Some("Jl. Veteran 10".into()),
        note: None,
    }
}

#[tokio::test]
async fn promo_price_drives_the_subtotal() {
    let app = TestApp::spawn().await;
    let user = app.register_user("buyer@example.com").await;
    let product = app.insert_product("Burger Spesial", 25_000, Some(15_000)).await;

    let receipt = app
        .state
        .services
        .orders
        .checkout(user, checkout_input(product, 2))
        .await
        .unwrap();

    // 2 * 15_000 promo + 5_000 delivery
    assert_eq!(receipt.total, 35_000);

    let order = Order::find_by_id(receipt.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.subtotal, 30_000);
    assert_eq!(order.delivery_fee, 5_000);
    assert_eq!(order.status, "pending");

    // The item snapshots both catalog prices as they were at checkout.
    let item = OrderItem::find().one(&*app.db).await.unwrap().unwrap();
    assert_eq!(item.order_id, order.id);
    assert_eq!(item.qty, 2);
    assert_eq!(item.price, 25_000);
    assert_eq!(item.promo_price, Some(15_000));
}

#[tokio::test]
async fn zero_promo_price_is_ignored() {
    let app = TestApp::spawn().await;
    let user = app.register_user("buyer@example.com").await;
    let product = app.insert_product("Es Teh", 5_000, Some(0)).await;

    let receipt = app
        .state
        .services
        .orders
        .checkout(user, checkout_input(product, 1))
        .await
        .unwrap();

    assert_eq!(receipt.total, 10_000); // 5_000 + delivery fee
}

#[tokio::test]
async fn pickup_has_no_delivery_fee() {
    let app = TestApp::spawn().await;
    let user = app.register_user("buyer@example.com").await;
    let product = app.insert_product("Nasi Pecel", 25_000, None).await;

    let mut input = checkout_input(product, 1);
    input.delivery_method = DeliveryMethod::Pickup;

    let receipt = app.state.services.orders.checkout(user, input).await.unwrap();
    assert_eq!(receipt.total, 25_000);
}

#[tokio::test]
async fn unknown_product_creates_no_rows() {
    let app = TestApp::spawn().await;
    let user = app.register_user("buyer@example.com").await;

    let err = app
        .state
        .services
        .orders
        .checkout(user, checkout_input(999, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    assert_eq!(Order::find().count(&*app.db).await.unwrap(), 0);
    assert_eq!(OrderItem::find().count(&*app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app.register_user("buyer@example.com").await;
    let product = app.insert_product("Cilok", 10_000, None).await;

    let err = app
        .state
        .services
        .orders
        .checkout(user, checkout_input(product, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn cash_checkout_skips_the_gateway() {
    let app = TestApp::spawn().await;
    let user = app.register_user("buyer@example.com").await;
    let product = app.insert_product("Tempe Mendoan", 25_000, None).await;

    let receipt = app
        .state
        .services
        .orders
        .checkout(user, checkout_input(product, 1))
        .await
        .unwrap();

    assert!(receipt.payment_url.is_none());
    let order = Order::find_by_id(receipt.id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert!(order.payment_url.is_none());
    assert!(order.midtrans_order_id.is_none());
}

#[tokio::test]
async fn online_checkout_without_gateway_issues_placeholder_url() {
    let app = TestApp::spawn().await;
    let user = app.register_user("buyer@example.com").await;
    let product = app.insert_product("Salad Buah", 25_000, None).await;

    let mut input = checkout_input(product, 1);
    input.payment_method = PaymentMethod::Qris;

    let receipt = app.state.services.orders.checkout(user, input).await.unwrap();
    let url = receipt.payment_url.expect("placeholder url");
    assert_eq!(url, format!("https://sandbox.example/pay/{}", receipt.id));
}

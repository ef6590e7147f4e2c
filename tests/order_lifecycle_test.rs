mod common;

use common::TestApp;
use warung_api::errors::ServiceError;
use warung_api::services::orders::{
    CheckoutInput, DeliveryMethod, OrderStatusFilter, PaymentMethod,
};

async fn place_order(app: &TestApp, user: i64, product: i64) -> i64 {
    app.state
        .services
        .orders
        .checkout(
            user,
            CheckoutInput {
                product_id: product,
                qty: 1,
                payment_method: PaymentMethod::Cash,
                delivery_method: DeliveryMethod::Pickup,
                address: None,
                note: None,
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn pending_orders_can_be_canceled_idempotently() {
    let app = TestApp::spawn().await;
    let user = app.register_user("orders@example.com").await;
    let product = app.insert_product("Nasi Goreng", 20_000, None).await;
    let order = place_order(&app, user, product).await;

    app.state.services.orders.cancel_order(user, order).await.unwrap();
    // Second cancel is a no-op success.
    app.state.services.orders.cancel_order(user, order).await.unwrap();

    let history = app
        .state
        .services
        .orders
        .list_orders(user, OrderStatusFilter::History)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, "canceled");
}

#[tokio::test]
async fn paid_orders_cannot_be_canceled() {
    let app = TestApp::spawn().await;
    let user = app.register_user("orders@example.com").await;
    let product = app.insert_product("Nasi Goreng", 20_000, None).await;
    let order = place_order(&app, user, product).await;

    app.state.services.orders.confirm_payment(user, order).await.unwrap();
    // Confirming again is fine.
    app.state.services.orders.confirm_payment(user, order).await.unwrap();

    let err = app
        .state
        .services
        .orders
        .cancel_order(user, order)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn orders_are_invisible_to_other_users() {
    let app = TestApp::spawn().await;
    let alice = app.register_user("alice@example.com").await;
    let bob = app.register_user("bob@example.com").await;
    let product = app.insert_product("Es Teh", 5_000, None).await;
    let order = place_order(&app, alice, product).await;

    let err = app
        .state
        .services
        .orders
        .cancel_order(bob, order)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    assert!(app
        .state
        .services
        .orders
        .list_orders(bob, OrderStatusFilter::All)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn status_filter_splits_processing_from_history() {
    let app = TestApp::spawn().await;
    let user = app.register_user("orders@example.com").await;
    let product = app.insert_product("Tempe Mendoan", 7_000, None).await;

    let in_flight = place_order(&app, user, product).await;
    let done = place_order(&app, user, product).await;
    app.state.services.orders.confirm_payment(user, done).await.unwrap();

    let processing = app
        .state
        .services
        .orders
        .list_orders(user, OrderStatusFilter::Processing)
        .await
        .unwrap();
    assert_eq!(processing.len(), 1);
    assert_eq!(processing[0].id, in_flight);

    let history = app
        .state
        .services
        .orders
        .list_orders(user, OrderStatusFilter::History)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, done);

    let all = app
        .state
        .services
        .orders
        .list_orders(user, OrderStatusFilter::All)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    // Newest first.
    assert_eq!(all[0].id, done);
}

#[tokio::test]
async fn order_list_joins_product_and_own_rating() {
    let app = TestApp::spawn().await;
    let user = app.register_user("orders@example.com").await;
    let other = app.register_user("other@example.com").await;
    let product = app.insert_product("Salad Buah", 18_000, None).await;
    place_order(&app, user, product).await;

    app.state
        .services
        .reviews
        .create(user, product, 4, Some("Enak".into()))
        .await
        .unwrap();
    // A different user's rating must not leak into the join.
    app.state.services.reviews.create(other, product, 1, None).await.unwrap();

    let orders = app
        .state
        .services
        .orders
        .list_orders(user, OrderStatusFilter::All)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
    let view = &orders[0];
    assert_eq!(view.qty, 1);
    assert_eq!(view.my_rating, Some(4));
    let product_view = view.product.as_ref().expect("joined product");
    assert_eq!(product_view.name, "Salad Buah");
    assert_eq!(product_view.store, "Warung Pak Tri");
}

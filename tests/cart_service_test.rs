mod common;

use common::TestApp;
use warung_api::errors::ServiceError;

#[tokio::test]
async fn adding_same_product_twice_merges_into_one_row() {
    let app = TestApp::spawn().await;
    let user = app.register_user("cart@example.com").await;
    let product = app.insert_product("Es Jeruk", 8_000, None).await;

    app.state.services.cart.add(user, product, 1).await.unwrap();
    app.state.services.cart.add(user, product, 2).await.unwrap();

    let items = app.state.services.cart.list(user).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].qty, 3);
    assert_eq!(items[0].name, "Es Jeruk");
}

#[tokio::test]
async fn carts_are_scoped_per_user() {
    let app = TestApp::spawn().await;
    let alice = app.register_user("alice@example.com").await;
    let bob = app.register_user("bob@example.com").await;
    let product = app.insert_product("Roti Bakar", 12_000, None).await;

    app.state.services.cart.add(alice, product, 1).await.unwrap();

    assert!(app.state.services.cart.list(bob).await.unwrap().is_empty());

    // Bob cannot mutate Alice's line.
    let alice_items = app.state.services.cart.list(alice).await.unwrap();
    let err = app
        .state
        .services
        .cart
        .update_item(bob, alice_items[0].cart_id, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn quantity_can_be_set_and_the_row_removed() {
    let app = TestApp::spawn().await;
    let user = app.register_user("cart@example.com").await;
    let product = app.insert_product("Pisang Keju", 10_000, None).await;

    app.state.services.cart.add(user, product, 1).await.unwrap();
    let cart_id = app.state.services.cart.list(user).await.unwrap()[0].cart_id;

    app.state.services.cart.update_item(user, cart_id, 4).await.unwrap();
    assert_eq!(app.state.services.cart.list(user).await.unwrap()[0].qty, 4);

    app.state.services.cart.remove_item(user, cart_id).await.unwrap();
    assert!(app.state.services.cart.list(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_additions_are_rejected() {
    let app = TestApp::spawn().await;
    let user = app.register_user("cart@example.com").await;
    let product = app.insert_product("Cilok", 5_000, None).await;

    let err = app.state.services.cart.add(user, product, 0).await.unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = app.state.services.cart.add(user, 999, 1).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

mod common;

use common::TestApp;
use warung_api::errors::ServiceError;

#[tokio::test]
async fn one_review_per_user_and_product() {
    let app = TestApp::spawn().await;
    let user = app.register_user("rev@example.com").await;
    let product = app.insert_product("Burger Spesial", 25_000, None).await;

    app.state
        .services
        .reviews
        .create(user, product, 5, Some("Mantap".into()))
        .await
        .unwrap();

    let err = app
        .state
        .services
        .reviews
        .create(user, product, 3, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let listed = app.state.services.reviews.list_for_product(product).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].rating, 5);
}

#[tokio::test]
async fn ratings_outside_one_to_five_are_rejected() {
    let app = TestApp::spawn().await;
    let user = app.register_user("rev@example.com").await;
    let product = app.insert_product("Cilok", 5_000, None).await;

    for bad in [0, 6] {
        let err = app
            .state
            .services
            .reviews
            .create(user, product, bad, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }
}

#[tokio::test]
async fn updates_and_deletes_are_owner_only() {
    let app = TestApp::spawn().await;
    let alice = app.register_user("alice@example.com").await;
    let bob = app.register_user("bob@example.com").await;
    let product = app.insert_product("Es Teh", 5_000, None).await;

    let review = app
        .state
        .services
        .reviews
        .create(alice, product, 2, Some("Kurang".into()))
        .await
        .unwrap();

    let err = app
        .state
        .services
        .reviews
        .update(bob, review.id, Some(5), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let updated = app
        .state
        .services
        .reviews
        .update(alice, review.id, Some(4), Some("Membaik".into()))
        .await
        .unwrap();
    assert_eq!(updated.rating, 4);
    assert_eq!(updated.comment.as_deref(), Some("Membaik"));

    let err = app
        .state
        .services
        .reviews
        .delete(bob, review.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    app.state.services.reviews.delete(alice, review.id).await.unwrap();
    assert!(app
        .state
        .services
        .reviews
        .list_for_product(product)
        .await
        .unwrap()
        .is_empty());
}

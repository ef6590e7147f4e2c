mod common;

use common::TestApp;
use warung_api::errors::ServiceError;

async fn seeded_app() -> TestApp {
    let app = TestApp::spawn().await;
    app.insert_product("Burger Spesial", 25_000, Some(15_000)).await;
    app.insert_product("Nasi Pecel", 25_000, None).await;
    app
}

#[tokio::test]
async fn the_all_categories_sentinel_matches_everything() {
    let app = seeded_app().await;
    let catalog = &app.state.services.catalog;

    let all = catalog.list_products(Some("Semua"), None).await.unwrap();
    assert_eq!(all.len(), 2);

    let none = catalog.list_products(None, None).await.unwrap();
    assert_eq!(none.len(), 2);
}

#[tokio::test]
async fn category_match_is_exact_and_case_sensitive() {
    let app = seeded_app().await;
    let catalog = &app.state.services.catalog;

    let makanan = catalog.list_products(Some("Makanan"), None).await.unwrap();
    assert_eq!(makanan.len(), 2);

    // Lowercase is a different category.
    let lower = catalog.list_products(Some("makanan"), None).await.unwrap();
    assert!(lower.is_empty());
}

#[tokio::test]
async fn search_is_case_insensitive_on_name_and_store() {
    let app = seeded_app().await;
    let catalog = &app.state.services.catalog;

    let by_name = catalog.list_products(None, Some("bUrGeR")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Burger Spesial");

    // Both products share the store set by the test helper.
    let by_store = catalog.list_products(None, Some("pak tri")).await.unwrap();
    assert_eq!(by_store.len(), 2);

    let nothing = catalog.list_products(None, Some("zzz")).await.unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn missing_products_are_not_found() {
    let app = seeded_app().await;
    let err = app.state.services.catalog.get_product(999).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

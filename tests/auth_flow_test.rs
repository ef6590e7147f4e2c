mod common;

use common::TestApp;
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};
use warung_api::entities::{password_otp, PasswordOtp};
use warung_api::errors::ServiceError;

#[tokio::test]
async fn register_then_login_roundtrip() {
    let app = TestApp::spawn().await;
    let auth = &app.state.services.auth;

    let (user, token) = auth
        .register("Siti", "Siti@Example.com", "a strong password")
        .await
        .unwrap();
    // Emails are normalized to lowercase.
    assert_eq!(user.email, "siti@example.com");
    assert_eq!(user.role, "user");

    let principal = auth.verify_token(&token.token).unwrap();
    assert_eq!(principal.id, user.id);
    assert_eq!(principal.email, "siti@example.com");

    let (logged_in, _token) = auth
        .login("siti@example.com", "a strong password")
        .await
        .unwrap();
    assert_eq!(logged_in.id, user.id);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::spawn().await;
    let auth = &app.state.services.auth;

    auth.register("A", "dup@example.com", "a strong password")
        .await
        .unwrap();
    let err = auth
        .register("B", "dup@example.com", "another password")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let app = TestApp::spawn().await;
    let auth = &app.state.services.auth;

    auth.register("A", "login@example.com", "a strong password")
        .await
        .unwrap();

    let err = auth
        .login("login@example.com", "wrong password")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));

    let err = auth
        .login("nobody@example.com", "a strong password")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let app = TestApp::spawn().await;
    let err = app
        .state
        .services
        .auth
        .verify_token("not-a-jwt")
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));
}

#[tokio::test]
async fn profile_update_replaces_the_optional_fields() {
    let app = TestApp::spawn().await;
    let auth = &app.state.services.auth;

    let (user, _token) = auth
        .register("Siti", "profile@example.com", "a strong password")
        .await
        .unwrap();
    assert_eq!(user.phone, "");

    let updated = auth
        .update_profile(user.id, "Siti Rahayu", Some("0812345678"), None)
        .await
        .unwrap();
    assert_eq!(updated.name, "Siti Rahayu");
    assert_eq!(updated.phone, "0812345678");
    assert_eq!(updated.email, "profile@example.com");

    // An absent phone clears the stored value.
    let cleared = auth
        .update_profile(user.id, "Siti Rahayu", None, Some("https://cdn.example/a.png"))
        .await
        .unwrap();
    assert_eq!(cleared.phone, "");
    assert_eq!(cleared.avatar_url, "https://cdn.example/a.png");
}

#[tokio::test]
async fn profile_names_must_have_two_characters() {
    let app = TestApp::spawn().await;
    let auth = &app.state.services.auth;
    let (user, _token) = auth
        .register("Siti", "short@example.com", "a strong password")
        .await
        .unwrap();

    let err = auth
        .update_profile(user.id, " S ", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn password_reset_via_otp() {
    let app = TestApp::spawn().await;
    let auth = &app.state.services.auth;

    auth.register("A", "reset@example.com", "old password!")
        .await
        .unwrap();
    auth.forgot_password("reset@example.com").await.unwrap();

    let otp = PasswordOtp::find()
        .order_by_desc(password_otp::Column::Id)
        .one(&*app.db)
        .await
        .unwrap()
        .expect("otp row");
    assert_eq!(otp.code.len(), 6);

    auth.verify_otp("reset@example.com", &otp.code).await.unwrap();
    auth.reset_password("reset@example.com", &otp.code, "new password!")
        .await
        .unwrap();

    auth.login("reset@example.com", "new password!").await.unwrap();
    let err = auth
        .login("reset@example.com", "old password!")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized(_)));

    // The code is single-use.
    let err = auth
        .reset_password("reset@example.com", &otp.code, "third password!")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn unknown_emails_get_a_quiet_success_and_no_otp() {
    let app = TestApp::spawn().await;
    app.state
        .services
        .auth
        .forgot_password("ghost@example.com")
        .await
        .unwrap();
    assert_eq!(PasswordOtp::find().count(&*app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn otp_attempts_are_rate_limited() {
    let app = TestApp::spawn().await;
    let auth = &app.state.services.auth;
    auth.register("A", "limit@example.com", "a strong password")
        .await
        .unwrap();

    let mut limited = false;
    for _ in 0..10 {
        match auth.verify_otp("limit@example.com", "000000").await {
            Err(ServiceError::RateLimitExceeded) => {
                limited = true;
                break;
            }
            Err(ServiceError::ValidationError(_)) => continue,
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }
    assert!(limited);
}

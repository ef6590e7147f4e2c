use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectOptions, Database, DatabaseConnection,
    EntityTrait, Set,
};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use warung_api::config::{AppConfig, MidtransConfig};
use warung_api::entities::{product, user};
use warung_api::migrator::Migrator;
use warung_api::AppState;

/// A fully wired application over a private in-memory store. One sqlite
/// connection only: a pool would hand each checkout a different empty
/// database.
pub struct TestApp {
    pub state: AppState,
    pub db: Arc<DatabaseConnection>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
        opt.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("connect to sqlite");
        Migrator::up(&db, None).await.expect("run migrations");

        let db = Arc::new(db);
        let state = AppState::new(db.clone(), test_config());
        Self { state, db }
    }

    /// Inserts a product and returns its id.
    pub async fn insert_product(&self, name: &str, price: i64, promo_price: Option<i64>) -> i64 {
        let created = product::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            category: Set("Makanan".to_string()),
            store: Set("Warung Pak Tri".to_string()),
            price: Set(price),
            promo_price: Set(promo_price),
            rating: Set(4.5),
            image: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("insert product");
        created.id
    }

    /// Registers a user through the auth service and returns their id.
    pub async fn register_user(&self, email: &str) -> i64 {
        let (user, _token) = self
            .state
            .services
            .auth
            .register("Test User", email, "a strong password")
            .await
            .expect("register user");
        user.id
    }

    pub async fn find_user(&self, id: i64) -> Option<user::Model> {
        warung_api::entities::User::find_by_id(id)
            .one(&*self.db)
            .await
            .expect("query user")
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        jwt_secret: "test_secret_key_for_testing_purposes_only".into(),
        jwt_expiration: 3600,
        host: "127.0.0.1".into(),
        port: 0,
        environment: "test".into(),
        log_level: "debug".into(),
        log_json: false,
        auto_migrate: true,
        seed_catalog: false,
        midtrans: MidtransConfig::default(),
    }
}

use crate::config::AppConfig;
use crate::entities::{product, Product};
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Set,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for the SeaORM connection pool. Each request checks a
/// connection out of the pool for the duration of a statement and returns it
/// on every exit path; no handle is shared across requests.
pub type DbPool = DatabaseConnection;

/// Establishes a connection pool to the database.
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    debug!("Connecting to database at {}", database_url);

    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let pool = Database::connect(opt).await?;
    info!("Database connection established");
    Ok(pool)
}

pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    establish_connection(&cfg.database_url).await
}

/// Applies the versioned migration list in fixed order.
pub async fn run_migrations(db: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    crate::migrator::Migrator::up(db, None).await?;
    Ok(())
}

/// Seeds the demo catalog when the products table is empty. Idempotent;
/// a non-empty table is left untouched.
pub async fn seed_catalog(db: &DbPool) -> Result<(), ServiceError> {
    if Product::find().count(db).await? > 0 {
        return Ok(());
    }

    let seed: &[(&str, &str, &str, i64, Option<i64>, &str)] = &[
        ("Burger Spesial", "Makanan", "Warung Pak Tri", 25_000, Some(15_000), "burger.png"),
        ("Nasi Pecel", "Makanan", "Warung Pak Komto", 25_000, None, "nasipecel.png"),
        ("Nasi Goreng Spesial", "Makanan", "Warung Pak Komto", 25_000, None, "nasigoreng.png"),
        ("Es Teh", "Minuman", "Warung Pak Tri", 5_000, None, "esteh.png"),
        ("Es Jeruk", "Minuman", "Warung Pak Komto", 25_000, None, "esjeruk.png"),
        ("Tempe Mendoan", "Snacks", "Warung Pak Tri", 25_000, None, "tempe.png"),
        ("Cilok", "Snacks", "Warung Bu Sri", 25_000, None, "cilok.png"),
        ("Pisang Keju", "Dessert", "Warung Pak Tri", 25_000, None, "pisangkeju.png"),
        ("Salad Buah", "Dessert", "Warung Bu Sri", 25_000, None, "saladbuah.png"),
        ("French Fries", "Snacks", "WOW", 25_000, None, "kentang.png"),
        ("Roti Bakar", "Dessert", "Warung Pak Madjid", 25_000, None, "rotibakar.png"),
    ];

    let rows = seed.iter().map(|(name, category, store, price, promo, image)| {
        product::ActiveModel {
            id: NotSet,
            name: Set((*name).to_string()),
            category: Set((*category).to_string()),
            store: Set((*store).to_string()),
            price: Set(*price),
            promo_price: Set(*promo),
            rating: Set(4.9),
            image: Set(Some((*image).to_string())),
            created_at: Set(Utc::now()),
        }
    });

    Product::insert_many(rows).exec(db).await?;
    info!("Seeded demo catalog with {} products", seed.len());
    Ok(())
}

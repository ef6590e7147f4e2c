use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use warung_api::{config, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config().context("configuration failed to load")?;
    config::init_tracing(&app_config.log_level, app_config.log_json);
    info!(environment = %app_config.environment, "Starting warung-api");

    let db = Arc::new(
        db::establish_connection_from_app_config(&app_config)
            .await
            .context("database connection failed")?,
    );

    if app_config.auto_migrate {
        db::run_migrations(&db).await.context("migrations failed")?;
    }
    if app_config.seed_catalog {
        db::seed_catalog(&db).await.context("catalog seed failed")?;
    }

    let state = AppState::new(db, app_config);
    warung_api::serve(state).await.context("server exited")?;
    Ok(())
}

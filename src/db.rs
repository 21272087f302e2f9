use crate::config::DatabaseConfig;
use rocket::fairing::AdHoc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

async fn init_pool(db_config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout))
        .idle_timeout(Duration::from_secs(30))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&db_config.url)
        .await
}

async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Opens the pool on ignite (optionally migrating) and closes it on shutdown.
pub fn stage_db(db_config: DatabaseConfig) -> AdHoc {
    AdHoc::on_ignite("Postgres (sqlx)", |rocket| async move {
        rocket
            .attach(AdHoc::try_on_ignite("Postgres pool", |rocket| async move {
                let pool = match init_pool(&db_config).await {
                    Ok(pool) => pool,
                    Err(e) => {
                        tracing::error!("Failed to initialize database pool: {}", e);
                        return Err(rocket);
                    }
                };
                tracing::info!("Database pool initialized successfully");

                if db_config.run_migrations {
                    if let Err(e) = run_migrations(&pool).await {
                        tracing::error!("Failed to run database migrations: {}", e);
                        return Err(rocket);
                    }
                    tracing::info!("Database migrations applied");
                }

                Ok(rocket.manage(pool))
            }))
            .attach(AdHoc::on_shutdown("Postgres pool close", |rocket| {
                Box::pin(async move {
                    if let Some(pool) = rocket.state::<PgPool>() {
                        pool.close().await;
                        tracing::info!("Database pool closed");
                    }
                })
            }))
    })
}

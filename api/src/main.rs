use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;

use cp_api::telemetry::init_tracing;
use cp_api::{create_app, AppState};
use cp_core::repositories::{InMemoryUserRepository, UserRepository};
use cp_core::services::auth::AuthServiceConfig;
use cp_core::services::token::{TokenIssuer, TokenIssuerConfig};
use cp_infra::database::{DatabasePool, MySqlUserRepository};
use cp_shared::{AppConfig, StorageBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting CareerPilot session service");

    let issuer = TokenIssuer::new(TokenIssuerConfig::from(&config.auth.jwt))
        .context("Invalid token signing configuration")?;

    let (repository, pool): (Arc<dyn UserRepository>, Option<DatabasePool>) = match config.storage {
        StorageBackend::Mysql => {
            let pool = DatabasePool::new(&config.database)
                .await
                .context("Failed to connect to the database")?;
            pool.run_migrations()
                .await
                .context("Failed to run database migrations")?;
            info!("{}", pool.get_statistics());
            let repository: Arc<dyn UserRepository> =
                Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));
            (repository, Some(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; sessions are lost on restart");
            let repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
            (repository, None)
        }
    };

    let state = web::Data::new(AppState::new(
        repository,
        issuer,
        AuthServiceConfig::default(),
        config.auth.cookies.clone(),
    ));

    let bind_address = config.server.bind_address();
    info!(address = %bind_address, "Binding HTTP server");

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("HTTP server terminated with an error");

    if let Some(pool) = pool {
        pool.close().await;
    }
    result
}

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use otp_api::app::{build_auth_service, configure_app, AppState};
use otp_api::middleware::create_cors;
use otp_api::telemetry::init_tracing;
use otp_core::repositories::{InMemoryUserRepository, UserRepository};
use otp_core::services::auth::AuthService;
use otp_core::services::cache::InMemoryCacheStore;
use otp_core::services::clock::{Clock, SystemClock};
use otp_core::services::otp::{OtpDelivery, OtpProvider};
use otp_core::services::rate_limit::RateLimiterTrait;
use otp_core::services::token::TokenProvider;
use otp_infra::{DatabasePool, LoggingOtpDelivery, MySqlUserRepository, RedisCacheStore, RedisClient};
use otp_shared::config::{AppConfig, ServerConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    info!(
        environment = %config.environment,
        in_memory_stores = config.in_memory_stores,
        "Starting OTP auth server"
    );
    if config.jwt.uses_default_secret() {
        warn!("JWT secret is the built-in default; set APP__JWT__SECRET outside development");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let delivery = Arc::new(LoggingOtpDelivery::new(config.environment.is_development()));

    if config.in_memory_stores {
        warn!("Using in-process stores; state is lost on restart and not shared between instances");
        let cache = Arc::new(InMemoryCacheStore::with_clock(clock.clone()));
        let users = Arc::new(InMemoryUserRepository::new());
        let service = build_auth_service(&config, cache, users, delivery, clock)?;
        return serve(&config.server, service).await;
    }

    let redis = RedisClient::new(config.cache.clone())
        .await
        .context("failed to connect to Redis")?;
    let database = DatabasePool::connect(&config.database)
        .await
        .context("failed to connect to MySQL")?;
    if config.database.migrate_on_start {
        database.run_migrations().await.context("failed to run migrations")?;
    }

    let cache = Arc::new(RedisCacheStore::new(redis));
    let users = Arc::new(MySqlUserRepository::new(database.pool().clone()));
    let service = build_auth_service(&config, cache, users, delivery, clock)?;
    serve(&config.server, service).await?;

    database.close().await;
    Ok(())
}

async fn serve<O, R, T, U, D>(server: &ServerConfig, service: AuthService<O, R, T, U, D>) -> anyhow::Result<()>
where
    O: OtpProvider + 'static,
    R: RateLimiterTrait + 'static,
    T: TokenProvider + 'static,
    U: UserRepository + 'static,
    D: OtpDelivery + 'static,
{
    let state = web::Data::new(AppState::new(service));
    let origins = server.allowed_origins.clone();

    let mut http = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(create_cors(&origins))
            .wrap(TracingLogger::default())
            .configure(configure_app::<O, R, T, U, D>)
    });
    if server.workers > 0 {
        http = http.workers(server.workers);
    }

    let address = server.bind_address();
    info!(address = %address, "Listening");
    http.bind(&address)
        .with_context(|| format!("failed to bind {}", address))?
        .run()
        .await?;
    Ok(())
}

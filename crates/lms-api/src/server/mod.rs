//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::sync::Arc;

use axum::Router;
use lms_cache::{MailOutbox, RedisNotifier, RedisPool};
use lms_common::{AppConfig, AppError, JwtService};
use lms_core::SystemClock;
use lms_db::{
    create_pool, run_migrations, PgActivityLogRepository, PgAttendanceRepository,
    PgBookRepository, PgBorrowingRepository, PgCategoryRepository, PgLibraryRepository,
    PgMemberRepository, PgMessageRepository, PgReservationRepository,
};
use lms_service::{FsCoverStore, ServiceContext, ServiceSettings};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware_with_config;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware.
///
/// Health probes are merged after the middleware stack so they are never
/// rate limited.
///
/// # Errors
/// Returns an error if the rate limiter configuration is invalid
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;

    Ok(api.merge(health_routes()).with_state(state))
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = lms_db::DatabaseConfig::from(&config.database);
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    info!("Connecting to Redis...");
    let redis_pool =
        RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis connection established");

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));
    let offset = config
        .library
        .utc_offset()
        .map_err(|e| AppError::Config(e.to_string()))?;
    let clock = Arc::new(SystemClock::new(offset));
    let covers = Arc::new(FsCoverStore::new(&config.storage.upload_dir));

    let service_context = ServiceContext::builder()
        .library_repo(Arc::new(PgLibraryRepository::new(pool.clone())))
        .category_repo(Arc::new(PgCategoryRepository::new(pool.clone())))
        .book_repo(Arc::new(PgBookRepository::new(pool.clone())))
        .member_repo(Arc::new(PgMemberRepository::new(pool.clone())))
        .borrowing_repo(Arc::new(PgBorrowingRepository::new(pool.clone())))
        .reservation_repo(Arc::new(PgReservationRepository::new(pool.clone())))
        .attendance_repo(Arc::new(PgAttendanceRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .activity_repo(Arc::new(PgActivityLogRepository::new(pool.clone())))
        .notifier(Arc::new(RedisNotifier::new(redis_pool.clone())))
        .mailer(Arc::new(MailOutbox::new(redis_pool.clone())))
        .covers(covers)
        .jwt_service(jwt_service)
        .clock(clock)
        .settings(ServiceSettings::from(&config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config, pool, redis_pool))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, &addr).await
}

//! GigScape Backend Server
//!
//! Rust backend for the GigScape freelance marketplace: jobs, proposals,
//! contracts, milestones, the wallet ledger, payments, reviews, chat and
//! notifications.

use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use gigscape_server::auth::{token_sweeper, AuthService, VerificationService};
use gigscape_server::chat::ChatService;
use gigscape_server::config::Config;
use gigscape_server::contract::ContractService;
use gigscape_server::db;
use gigscape_server::job::JobService;
use gigscape_server::middleware;
use gigscape_server::middleware::RateLimiter;
use gigscape_server::milestone::{overdue_detector, MilestoneService};
use gigscape_server::notification::NotificationService;
use gigscape_server::proposal::ProposalService;
use gigscape_server::review::ReviewService;
use gigscape_server::routes;
use gigscape_server::state::AppState;
use gigscape_server::transaction::{StripeClient, TransactionService};
use gigscape_server::wallet::WalletService;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(environment = config.environment.as_str(), "Starting GigScape server");

    // Initialize database connection pool and schema
    let db_pool = match db::create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&db_pool).await {
        tracing::error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    // Initialize services
    let auth_service = Arc::new(AuthService::new(
        db_pool.clone(),
        config.jwt_secret.clone(),
        config.jwt_access_token_ttl_seconds,
        config.jwt_refresh_token_ttl_days,
    ));

    let verification_service = Arc::new(VerificationService::new(
        db_pool.clone(),
        config.verification_token_ttl_hours,
    ));

    let stripe = StripeClient::new(
        config.stripe_secret_key.clone(),
        config.stripe_api_base.clone(),
    );

    let wallet_service = Arc::new(WalletService::new(
        db_pool.clone(),
        config.default_currency.clone(),
    ));

    let transaction_service = Arc::new(TransactionService::new(
        db_pool.clone(),
        stripe,
        config.default_currency.clone(),
    ));

    let contract_service = Arc::new(ContractService::new(db_pool.clone()));

    let milestone_service = Arc::new(MilestoneService::new(
        db_pool.clone(),
        config.default_currency.clone(),
    ));

    let proposal_service = Arc::new(ProposalService::new(
        db_pool.clone(),
        config.default_currency.clone(),
    ));

    let job_service = Arc::new(JobService::new(
        db_pool.clone(),
        config.default_currency.clone(),
    ));

    let review_service = Arc::new(ReviewService::new(db_pool.clone()));
    let chat_service = Arc::new(ChatService::new(db_pool.clone()));
    let notification_service = Arc::new(NotificationService::new(db_pool.clone()));

    let app_state = AppState {
        auth_service,
        verification_service: verification_service.clone(),
        wallet_service,
        transaction_service,
        contract_service,
        milestone_service: milestone_service.clone(),
        proposal_service,
        job_service,
        review_service,
        chat_service,
        notification_service,
    };

    // Start background sweepers
    let sweeper_service = (*verification_service).clone();
    tokio::spawn(async move {
        tracing::info!("Verification token sweeper started");
        token_sweeper(sweeper_service).await;
    });

    let overdue_service = (*milestone_service).clone();
    tokio::spawn(async move {
        tracing::info!("Overdue milestone detector started");
        overdue_detector(overdue_service).await;
    });

    // Clone db_pool for health check
    let health_db_pool = db_pool.clone();

    // Initialize rate limiter
    let rate_limiter = RateLimiter::new(config.rate_limit_rps);

    // Create the app router
    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(move || health_check(health_db_pool.clone())))
        .merge(routes::auth_routes())
        .merge(routes::user_routes())
        .merge(routes::wallet_routes())
        .merge(routes::transaction_routes())
        .merge(routes::contract_routes())
        .merge(routes::milestone_routes())
        .merge(routes::proposal_routes())
        .merge(routes::job_routes())
        .merge(routes::review_routes())
        .merge(routes::chat_routes())
        .merge(routes::notification_routes())
        .with_state(app_state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .layer(axum::middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            middleware::rate_limit_layer(limiter)(req, next)
        }))
        .layer(configure_cors(&config));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Serve with graceful shutdown
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

async fn root() -> &'static str {
    "GigScape API Server"
}

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

/// Health check endpoint
async fn health_check(pool: sqlx::PgPool) -> axum::Json<HealthResponse> {
    let db_status = match db::check_health(&pool).await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if db_status == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    axum::Json(HealthResponse {
        status: status.to_string(),
        database: db_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn configure_cors(config: &Config) -> CorsLayer {
    let Some(allowed_origins_str) = config.cors_allowed_origins.as_deref() else {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = allowed_origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

//! Stacks Server - Library Lending Backend

use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stacks_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{
        fines::HttpFineLedger, identity::HttpIdentityService, sweeper, Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("stacks_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Stacks Server v{}", env!("CARGO_PKG_VERSION"));

    // Collaborator clients
    let identity = Arc::new(HttpIdentityService::new(&config.collaborators)?);
    let fines = Arc::new(HttpFineLedger::new(&config.collaborators)?);

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new();
    let services = Services::new(repository, identity, fines, config.lending.clone());

    // Background sweeper for hold expiry and overdue detection
    tokio::spawn(sweeper::run(services.clone(), config.sweep.interval_secs));

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Catalog
        .route("/titles", get(api::catalog::list_titles))
        .route("/titles", post(api::catalog::register_title))
        .route("/titles/:key", get(api::catalog::get_title))
        .route("/titles/:key/copies", post(api::catalog::add_copies))
        .route("/titles/:key/copies/retire", post(api::catalog::retire_copies))
        .route("/titles/:key/maintenance", put(api::catalog::set_maintenance))
        .route("/titles/:key/reservations", get(api::reservations::get_title_reservations))
        // Reservations
        .route("/reservations", post(api::reservations::reserve))
        .route("/reservations/:id/cancel", post(api::reservations::cancel_reservation))
        .route("/holders/:id/reservations", get(api::reservations::get_holder_reservations))
        // Loans
        .route("/loans", post(api::loans::create_loan))
        .route("/loans/overdue", get(api::loans::get_overdue_loans))
        .route("/loans/due-soon", get(api::loans::get_due_soon_loans))
        .route("/loans/return", post(api::loans::return_loan))
        .route("/loans/:id", get(api::loans::get_loan))
        .route("/loans/:id/renew", post(api::loans::renew_loan))
        .route("/loans/:id/lost", post(api::loans::mark_loan_lost))
        .route("/holders/:id/loans", get(api::loans::get_holder_loans))
        // Sweeps
        .route("/sweeps/expired-holds", post(api::reservations::sweep_expired_holds))
        .route("/sweeps/overdue-loans", post(api::loans::sweep_overdue_loans))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

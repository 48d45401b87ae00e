use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkguard_server::routes::{
    cancel_subscription, change_password, delete_account, get_profile, get_subscription,
    health_check, login, payment_history, payment_webhook, register, scan_link, update_profile,
    verify_payment,
};
use linkguard_server::{open_database, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkguard_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LinkGuard Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    // Open the database (creates tables on first run)
    let db = open_database(&config.database_path)?;

    // Configure CORS (the extension client calls from arbitrary page origins)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers(Any);

    // Create app state
    let state = AppState::new(db, config.clone());

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/scan/link", post(scan_link))
        .route("/api/user/profile", get(get_profile))
        .route("/api/user/profile", put(update_profile))
        .route("/api/user/change-password", post(change_password))
        .route("/api/user/payment-history", get(payment_history))
        .route("/api/user/subscription", get(get_subscription))
        .route("/api/user/subscription/cancel", post(cancel_subscription))
        .route("/api/user/account", delete(delete_account))
        .route("/api/payment/verify", post(verify_payment))
        .route("/api/payment/webhook", post(payment_webhook))
        .layer(cors)
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use axum::{
    Router, http,
    http::{Method, header},
};
use payment::{HttpPaymentGateway, InMemoryAttemptRepository, PaymentConfig, payment_router};
use platform::config::{EnvSource, ProcessEnv};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,payment=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = ProcessEnv;

    // Payment configuration: refuses to start without real credentials in production
    let payment_config = Arc::new(PaymentConfig::from_source(&env)?);
    tracing::info!(
        environment = %payment_config.environment,
        mode = ?payment_config.mode,
        khalti_enabled = payment_config.khalti_enabled(),
        "Payment configuration loaded"
    );

    let gateway = HttpPaymentGateway::from_config(payment_config.clone())?;
    let attempts = InMemoryAttemptRepository::new();

    // CORS configuration
    let frontend_origins = env
        .optional("FRONTEND_ORIGINS")
        .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/payments",
            payment_router(gateway, attempts, payment_config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env
        .parsed("BIND_ADDR")?
        .unwrap_or(SocketAddr::from(([0, 0, 0, 0], 31113)));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use talk2book::config::AppConfig;
use talk2book::handlers;
use talk2book::models::ExhibitionCatalog;
use talk2book::services::booking_id::RandomIdGenerator;
use talk2book::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    tracing::info!(
        venue = %config.branding.venue_name,
        typing_delay_ms = config.typing_delay_ms,
        payment_delay_ms = config.payment_delay_ms,
        "loaded configuration"
    );

    let state = Arc::new(AppState::new(
        config.clone(),
        ExhibitionCatalog::default(),
        Arc::new(RandomIdGenerator),
    ));

    let mut app = handlers::router(state).layer(TraceLayer::new_for_http());
    if config.cors_allow_any {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use farmgate_web::config::AppConfig;
use farmgate_web::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("farmgate_web=info,tower_http=warn")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        "Starting Farmgate pricing calculator ({:?} pricing)",
        config.mode
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config);

    let app = router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

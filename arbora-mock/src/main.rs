use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arbora_mock=info,tower_http=info".into()),
        )
        .with_target(false)
        .init();

    let state = arbora_mock::MockState::seeded().await;
    let app = arbora_mock::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = arbora_mock::listen_addr_from_env();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Mock backend listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

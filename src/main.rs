use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use s3_relay::config;
use s3_relay::issuer::HttpTokenIssuer;
use s3_relay::state::AppState;
use s3_relay::storage::StoreGate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Store client is built lazily by the first request / 存储客户端由首个请求创建
    let factory = s3_relay::drivers::create_factory(&app_config.store)?;
    tracing::info!(
        "Store driver: {} (max {} concurrent transfers)",
        factory.driver_type(),
        app_config.store.max_connections
    );

    let issuer = HttpTokenIssuer::new(&app_config.issuer.endpoint, &app_config.issuer.token);

    let state = Arc::new(AppState::new(
        StoreGate::new(factory),
        Arc::new(issuer),
        app_config.context.clone(),
    ));

    let app = s3_relay::api::router(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wpcards::{build_router, config::DEFAULT_LOG_FILTER, AppState, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_args()?;
    tracing::debug!("{:#?}", config);

    let state = AppState::new(&config)?;
    state.load_posts().await;

    let listener = tokio::net::TcpListener::bind(config.net.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving posts");

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

use anyhow::Context;
use quote_service::{LogFormat, ServiceConfig, create_app};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing from `RUST_LOG` and the chosen output format.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quote_service=debug,quote_flow=debug,tower_http=debug".into());

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env());
    let config = ServiceConfig::from_env();

    let app = create_app(&config);
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    let addr = listener.local_addr()?;

    info!("Quote service starting on {}", addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!("First step: GET http://{}/quote/location", addr);

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

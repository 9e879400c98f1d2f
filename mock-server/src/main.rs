use mock_server::Options;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let cold_start_checks = std::env::var("COLD_START_CHECKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, cold_start_checks, "mock feedback API listening");
    mock_server::run_with(listener, Options { cold_start_checks }).await
}

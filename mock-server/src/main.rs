use mock_server::MockConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let defaults = MockConfig::default();
    let config = MockConfig {
        project: std::env::var("NLU_PROJECT").unwrap_or(defaults.project),
        token: std::env::var("NLU_TOKEN").unwrap_or(defaults.token),
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, project = %config.project, "mock NLU service listening");
    mock_server::run(listener, config).await
}

use eureka_opizontas::{EurekaConfig, server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EurekaConfig::load()?;
    tracing::info!(service_name = %config.service_name, "Starting registry client host...");
    server::start(config).await?;
    Ok(())
}

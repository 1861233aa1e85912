use checkout_orchestrator::config::AppConfig;
use checkout_orchestrator::server::{init_tracing, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);

    tracing::info!(
        environment = ?config.server.environment,
        "Checkout orchestrator starting"
    );

    serve(config).await?;
    Ok(())
}

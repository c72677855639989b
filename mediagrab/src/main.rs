use mediagrab::api::server::{ApiServer, ApiServerConfig};
use mediagrab::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them.
    dotenvy::dotenv().ok();

    logging::init();

    let config = ApiServerConfig::from_env_or_default();
    let server = ApiServer::new(config);
    let cancel_token = server.cancel_token();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {e}");
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_token.cancel();
    });

    server.run().await?;

    tracing::info!("mediagrab stopped");
    Ok(())
}

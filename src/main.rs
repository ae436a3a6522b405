use aircargo_enrich::adapters::bedrock::load_sdk_config;
use aircargo_enrich::utils::{logger, validation::Validate};
use aircargo_enrich::{build_router, AppState, BedrockClient, CliConfig, S3Storage, UrlFetcher};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // AWS credentials may live in a local .env
    dotenvy::dotenv().ok();

    let cli = CliConfig::parse();
    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting aircargo-enrich v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.load().context("failed to load configuration")?;
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e.into());
    }
    tracing::debug!("Effective configuration: {:?}", config);

    let sdk_config = load_sdk_config(&config).await;
    let bedrock = Arc::new(BedrockClient::new(&sdk_config, &config));
    let storage = Arc::new(S3Storage::new(aws_sdk_s3::Client::new(&sdk_config)));
    let fetcher = UrlFetcher::new(&config.fetch)?.with_storage(storage);

    let state = AppState::new(
        bedrock.clone(),
        bedrock,
        Arc::new(fetcher),
        &config.image,
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!("Listening on http://{}", config.server.bind);
    tracing::info!(
        "Using region {} with models {} / {}",
        config.aws.region,
        config.inference.text_model_id,
        config.inference.image_model_id
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

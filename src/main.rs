use anyhow::{Context, Result};
use murmur::integration::{probe_model, MurmurConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmur=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Murmur voice assistant");

    let config = MurmurConfig::discover().context("Failed to load configuration")?;
    info!(
        "Using model {} at {}",
        config.model.name, config.model.host
    );
    probe_model(&config);

    murmur::ui::run(config).map_err(|e| anyhow::anyhow!("GUI error: {}", e))?;
    Ok(())
}

//! Flowscope server binary

use anyhow::Context;
use flowscope_api::AppState;
use flowscope_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flowscope=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let config = load_config()?;
    tracing::info!(
        index_url = %config.index.url,
        index = %config.index.index,
        "Starting Flowscope"
    );

    let state = AppState::with_config(config);
    flowscope_api::start_server(state)
        .await
        .context("API server failed")?;

    Ok(())
}

/// Load configuration from the path in FLOWSCOPE_CONFIG, or defaults
fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var("FLOWSCOPE_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            let config = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path))?;
            Ok(config)
        }
        Err(_) => {
            tracing::info!("FLOWSCOPE_CONFIG not set, using default configuration");
            Ok(AppConfig::default())
        }
    }
}

use tracing::info;

use crudcheck_server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // HOST, PORT and STATIC_DIR; the harness exports PORT.
    let config = ServerConfig::from_env()?;

    info!(
        "Starting items backend on http://{} (static: {})",
        config.addr(),
        config.static_dir.display()
    );

    crudcheck_server::serve(config).await
}

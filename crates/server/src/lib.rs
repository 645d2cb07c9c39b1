//! Reference items backend
//!
//! A conformant implementation of the API the crudcheck harness checks:
//! health, an in-memory items collection with full CRUD (JSON or urlencoded
//! bodies), static files for everything outside `/api`, and a JSON 404 for
//! the rest. Every response carries hardening headers.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod store;

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::{router, AppState};
pub use store::{Item, ItemStore};

/// Bind the configured address and serve until SIGTERM or ctrl-c
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.addr()).await?;
    serve_on(listener, config.static_dir, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves
pub async fn serve_on(
    listener: TcpListener,
    static_dir: PathBuf,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("Items backend listening on http://{}", listener.local_addr()?);
    info!("Serving static files from {}", static_dir.display());

    let app = router(Arc::new(AppState::default()), &static_dir);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Items backend stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

use dotenvy::dotenv;
use snafu::ResultExt;
use tokio::net::TcpListener;

use watch_progress::api::{cors_layer, create_app, create_router};
use watch_progress::config::Config;
use watch_progress::error::{
    ApplicationError, BindAddressSnafu, ConnectDatabaseSnafu, WebServerSnafu,
};
use watch_progress::logger;
use watch_progress::service::database::Backend;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env()?;

    let _guard = logger::init(&config)?;

    let backend = Backend::connect(&config.store)
        .await
        .context(ConnectDatabaseSnafu)?;

    let app = create_app(&config, backend);
    let router = create_router(app, cors_layer(&config.allowed_origins)?);

    let listener = TcpListener::bind(config.host)
        .await
        .context(BindAddressSnafu {
            address: config.host,
        })?;

    tracing::info!(address = %config.host, policy = ?config.position_policy, "server is running");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(WebServerSnafu)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "could not listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutting down");
}

use anyhow::Context;
use house_service::{
    app,
    cli::Cli,
    utils::{clock::system_clock, logging::init_tracing},
    AppState, HouseServiceConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    let config = HouseServiceConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    init_tracing(&config.server.log_level, config.server.log_format, cli.verbose);

    let secret = config.jwt_secret()?;
    let stores = config
        .database_provider()
        .create_stores()
        .await
        .context("failed to open storage")?;

    let addr = config.bind_addr();
    if config.auth.dummy_login_enabled {
        tracing::warn!("dummy login is enabled; do not run this configuration in production");
    }

    let state = AppState::new(&config, secret.as_bytes(), stores, system_clock());
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "house-service listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("house-service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

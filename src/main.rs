use anyhow::Context;
use authgate::{
    cli::{Cli, Commands},
    utils::toml_config::{AuthGateConfig, LogFormat, ServerConfig},
    AppState, AuthService,
};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(server: &ServerConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { server.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "authgate={0},authgate_server={0},tower_http={0}",
            default_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
}

fn check_config(config: &AuthGateConfig) -> anyhow::Result<()> {
    let secret = config.jwt_secret()?;

    println!("configuration OK");
    println!("  listen:        {}:{}", config.server.host, config.server.port);
    println!("  database:      {}", config.database.url);
    println!("  token ttl:     {} min", config.auth.token_ttl_minutes);
    println!("  leeway:        {} s", config.auth.leeway_secs);
    println!(
        "  argon2id:      m={} KiB, t={}, p={}",
        config.hashing.memory_kib, config.hashing.iterations, config.hashing.parallelism
    );
    println!(
        "  secret:        ${} ({} bytes)",
        config.auth.jwt_secret_env,
        secret.len()
    );
    Ok(())
}

async fn serve(config: AuthGateConfig) -> anyhow::Result<()> {
    let store = config
        .database_provider()
        .create_store()
        .await
        .context("failed to open account store")?;

    let settings = config.auth_settings()?;
    let service = AuthService::new(store, settings).context("failed to build auth service")?;

    let state = AppState {
        auth: Arc::new(service),
    };
    let app = authgate::app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "authgate listening");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    tracing::info!("shutdown signal received, draining connections");
    let _ = stop_tx.send(());

    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(Ok(Ok(()))) => tracing::info!("server stopped"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "server stopped with error"),
        Ok(Err(e)) => tracing::error!(error = %e, "server task failed"),
        Err(_) => tracing::warn!(
            timeout = ?config.shutdown_timeout(),
            "graceful shutdown timed out"
        ),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Tracing must exist before config loading so its warnings are visible,
    // but the level comes from the config. Peek at the file first.
    let server_config = std::fs::read_to_string(&cli.config)
        .ok()
        .and_then(|content| AuthGateConfig::from_toml(&content).ok())
        .map(|c| c.server)
        .unwrap_or_default();
    init_tracing(&server_config, cli.verbose);

    let config = AuthGateConfig::load(&cli.config)
        .with_context(|| format!("invalid configuration in {}", cli.config.display()))?;

    match cli.resolved_command() {
        Commands::CheckConfig => check_config(&config),
        Commands::Serve => serve(config).await,
    }
}

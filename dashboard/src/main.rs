use anyhow::Context;
use bench_dashboard::{router, DashboardCli, DashboardConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = DashboardCli::parse();
    let config = DashboardConfig::from(&cli);

    if !config.data_dir.is_dir() {
        log::warn!(
            "Run document directory {} does not exist yet, requests will fail until it does",
            config.data_dir.display()
        );
    }

    let listener = tokio::net::TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("Failed to bind {}", cli.listen))?;
    log::info!(
        "Serving runs from {} on http://{}",
        config.data_dir.display(),
        cli.listen
    );

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            log::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

use asthma_intake::app;
use asthma_intake::config::AppConfig;
use asthma_intake::intake::spawn_expiry_task;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export CHANNEL_ACCESS_TOKEN=... CHANNEL_SECRET=... AQICN_API=...");
        std::process::exit(1);
    });

    eprintln!("🫁 Asthma intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://0.0.0.0:{}/callback", config.port);
    eprintln!("   Health:  http://0.0.0.0:{}/health", config.port);
    eprintln!("   AQI API: {}", config.aqicn_base_url);
    eprintln!(
        "   Session idle timeout: {} min\n",
        config.session_idle_timeout.as_secs() / 60
    );

    let app = app::build(&config)?;

    // Evict abandoned intakes in the background
    let _expiry_handle = spawn_expiry_task(app.store.clone(), config.sweep_interval);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Webhook server started");
    axum::serve(listener, app.router).await?;

    Ok(())
}

//! Tariff gateway entry point

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tariff_gateway::{
    Config, DosboxRunner, GatewayError, GatewayResult, GeminiRateLookup, TariffService, web,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "tariff-gateway")]
#[command(about = "HTTP gateway for the legacy DOS tariff engine")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, default_value = "5000")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> GatewayResult<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env());
    if config.gemini_api_key.is_none() {
        tracing::info!("GEMINI_API_KEY not set, live-rate lookup disabled");
    }

    let rate_lookup = Arc::new(GeminiRateLookup::new(config.gemini_api_key.clone()));
    let engine = Arc::new(
        DosboxRunner::new(config.dosbox_path.clone()).with_timeout(config.engine_timeout),
    );
    let service = TariffService::new(config.clone(), rate_lookup, engine);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::config(format!("failed to bind {addr}: {e}")))?;

    tracing::info!(
        asm_dir = %config.asm_dir.display(),
        "tariff gateway listening on http://{addr}"
    );

    axum::serve(listener, web::build_router(service)).await?;
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use gopher_server::GopherServer;
use gopher_server::args::Args;
use gopher_server::logging::init_logging;
use gopher_server::runtime::{RuntimeConfig, load_and_log_config, shutdown_signal};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref());

    let (mut config, _source) = load_and_log_config(&args.config)?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let runtime = RuntimeConfig::from_args(Some(args.effective_threads(&config)));
    runtime.build_runtime()?.block_on(run(config))
}

async fn run(config: gopher_server::Config) -> Result<()> {
    let server = GopherServer::from_config(&config)?;

    let addr = match server.start().await {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to start Gopher server: {:#}", e);
            return Err(e);
        }
    };
    info!("Gopher server ready on {}", addr);

    shutdown_signal().await;
    info!("Shutdown signal received, closing connections...");
    server.stop().await;
    info!("Graceful shutdown complete");

    Ok(())
}

mod analysis;
mod config;
mod core;
mod gateway;
mod graph;
mod tags;
mod trace;

use std::process::ExitCode;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::core::TraceError;
use crate::gateway::EsploraGateway;
use crate::trace::Tracer;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("chaintrace=info".parse().unwrap()),
        )
        .init();

    let Some(identifier) = std::env::args().nth(1) else {
        eprintln!("usage: chaintrace <address-or-txid>");
        return ExitCode::from(2);
    };

    // Load configuration
    let config = Config::load("config.toml");
    tracing::info!("Config: {:?}", config);

    let gateway = EsploraGateway::new(
        &config.gateway.base_url,
        Duration::from_secs(config.gateway.timeout_seconds),
    );
    let tracer = Tracer::new(gateway, &config);

    match tracer.trace(&identifier).await {
        Ok(result) => {
            let json = serde_json::to_string_pretty(&result)
                .expect("trace result serializes to JSON");
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e @ TraceError::InvalidIdentifier(_)) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!("trace failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

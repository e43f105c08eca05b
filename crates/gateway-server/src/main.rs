//! Lead gateway HTTP server
//!
//! Serves the browser-facing lead submission and user lookup endpoints in
//! front of the CRM REST API.

mod error;
mod routes;

use anyhow::Context;
use clap::{Arg, Command};
use gateway_core::{GatewayConfig, LeadGateway};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let matches = Command::new("gateway-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("CRM lead gateway")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .env("GATEWAY_CONFIG")
                .help("Optional configuration file; environment variables override it")
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_name("ADDR")
                .env("GATEWAY_BIND")
                .help("Address to listen on")
                .default_value("0.0.0.0:8888")
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let config = GatewayConfig::load(config_path.as_deref())?;
    match &config_path {
        Some(path) => log::info!("Loaded configuration from {} and environment", path.display()),
        None => log::info!("Loaded configuration from environment"),
    }

    if config.crm.api_key.is_none() {
        log::warn!("MK_API_KEY is not set; CRM operations will fail until it is configured");
    }
    log::info!("CRM base URL: {}", config.crm.base_url);
    for (name, id) in &config.attributes.fixed_ids {
        log::info!("Fixed attribute ID for {}: {}", name, id);
    }

    let gateway = LeadGateway::from_config(config)?;

    let bind = matches
        .get_one::<String>("bind")
        .context("bind address missing")?;
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    log::info!("Lead gateway listening on {}", bind);

    axum::serve(listener, routes::router(gateway))
        .await
        .context("HTTP server terminated unexpectedly")?;

    Ok(())
}

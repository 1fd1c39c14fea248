//! `PixyProxy` - image generation proxy with stored, queryable results.
//!
//! Startup order:
//! 1. Layer configuration: defaults, TOML file, environment, CLI flags.
//! 2. Validate provider options before touching the network.
//! 3. Initialise tracing.
//! 4. Connect the provider client and the database pool.
//! 5. Serve the HTTP API until SIGINT or SIGTERM.

mod adapters;
mod cli;
mod config;
mod context;
mod error;
mod generation;
mod guid;
mod middleware;
mod model;
mod output;
mod params;
mod ports;
mod routes;
mod service;
mod transaction;

use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::{Config, ServerConfig};
use crate::context::ServiceContext;
use crate::error::ImageError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ImageError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path).map_err(ImageError::Config)?;
    config.apply_env().map_err(ImageError::Config)?;
    cli.apply(&mut config);
    let options = config.generation_options().map_err(ImageError::Config)?;

    init_tracing(&config.server);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "pixyproxy starting"
    );

    let ctx = ServiceContext::live(&config, options).await?;
    let app = routes::build(Arc::new(ctx.image_service()));

    let bind = &config.server.bind;
    let listener = tokio::net::TcpListener::bind(bind.as_str())
        .await
        .map_err(|e| ImageError::Config(format!("cannot listen on {bind}: {e}")))?;
    info!(
        addr = %bind,
        images_dir = %config.server.images_dir.display(),
        "HTTP server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ImageError::Internal(format!("server error: {e}")))?;

    info!("pixyproxy stopped");
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level, falling back to `info`.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        server.log_level.parse::<EnvFilter>().unwrap_or_else(|e| {
            eprintln!(
                "WARN: log level '{}' is not a valid tracing filter ({e}); falling back to 'info'",
                server.log_level
            );
            EnvFilter::new("info")
        })
    });

    let subscriber =
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_thread_ids(true);

    if server.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown signal received; draining connections");
}

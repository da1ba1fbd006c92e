//! The `clarity serve` command: run the HTTP triage service.

use anyhow::Context;
use clap::Args;
use clarity_core::{Config, TriageProcessor};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use crate::api::create_router;
use crate::state::AppState;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    fn bind_addr(&self, config: &Config) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(config.server.host),
            self.port.unwrap_or(config.server.port),
        )
    }
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let addr = args.bind_addr(&config);

    let processor = TriageProcessor::new(&config).context("Failed to build triage pipeline")?;
    info!(
        provider = %config.llm.provider,
        blur_threshold = config.analysis.blur_threshold,
        "Triage pipeline ready"
    );

    let app = create_router(Arc::new(AppState::new(processor)));

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ServeArgs,
    }

    #[test]
    fn bind_addr_defaults_to_config() {
        let args = TestCli::try_parse_from(["serve"]).unwrap().args;
        let addr = args.bind_addr(&Config::default());
        assert_eq!(addr.to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn bind_addr_flags_override_config() {
        let args = TestCli::try_parse_from(["serve", "--host", "127.0.0.1", "-p", "9090"])
            .unwrap()
            .args;
        let addr = args.bind_addr(&Config::default());
        assert_eq!(addr.to_string(), "127.0.0.1:9090");
    }

    #[test]
    fn rejects_invalid_host() {
        assert!(TestCli::try_parse_from(["serve", "--host", "not-an-ip"]).is_err());
    }
}

//! Gateway client entry point
//!
//! Run with:
//! ```bash
//! DISCORD_TOKEN=... cargo run -p gateway-client
//! ```
//!
//! Configuration is loaded from environment variables.

use gateway_client::auth::StdinMfaPrompt;
use gateway_client::{GatewayClient, GatewayEventType};
use gateway_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Configuration first so the log format can follow the environment
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Gateway client failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        name = %config.app.name,
        env = ?config.app.env,
        url = %config.gateway.url,
        "Starting gateway client..."
    );

    let client = GatewayClient::from_config(&config, &StdinMfaPrompt).await?;
    if client.token().is_empty() {
        warn!("No token obtained, the gateway will likely reject Identify");
    }

    client.subscribe_event(GatewayEventType::Ready, |client, message| async move {
        let user = message.d["user"]["username"].as_str().unwrap_or("unknown");
        info!(user, session_id = %client.identity().session_id, "Logged in");
    });

    client.connect().await?;

    tokio::select! {
        () = shutdown_signal() => client.close().await,
        () = client.wait_closed() => info!("Session ended by the gateway"),
    }

    client.wait_closed().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Signal received, closing session");
}

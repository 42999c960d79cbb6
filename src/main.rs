//! snapshot-validation-webhook - admission webhook for snapshot classes.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Creates the Kubernetes client
//! - Starts the class caches backing the default-class check
//! - Starts the health server and the TLS webhook server

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use kube::Api;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use snapshot_validation_webhook::config::{Config, LogFormat};
use snapshot_validation_webhook::crd::{VolumeGroupSnapshotClass, VolumeSnapshotClass};
use snapshot_validation_webhook::health::{HealthState, run_health_server};
use snapshot_validation_webhook::{WebhookState, class_reflector, kube_client, run_webhook_server};

/// Grace period for in-flight admission requests during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_tracing(config.log_format)?;

    // Both kube and axum-server link rustls; pick the provider explicitly.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    info!(
        webhook_port = config.webhook_port,
        health_port = config.health_port,
        "Starting snapshot-validation-webhook"
    );

    let client = kube_client().await?;
    info!("Connected to Kubernetes cluster");

    let (snapshot_classes, snapshot_watch) = class_reflector(
        Api::<VolumeSnapshotClass>::all(client.clone()),
        "VolumeSnapshotClass",
    );
    let (group_snapshot_classes, group_snapshot_watch) = class_reflector(
        Api::<VolumeGroupSnapshotClass>::all(client),
        "VolumeGroupSnapshotClass",
    );
    let snapshot_watch_handle = tokio::spawn(snapshot_watch);
    let group_snapshot_watch_handle = tokio::spawn(group_snapshot_watch);

    let health_state = Arc::new(HealthState::new());

    // Ready once both caches hold their initial list
    {
        let health_state = health_state.clone();
        let snapshot_classes = snapshot_classes.clone();
        let group_snapshot_classes = group_snapshot_classes.clone();
        tokio::spawn(async move {
            let (snapshots, groups) = tokio::join!(
                snapshot_classes.wait_until_synced(),
                group_snapshot_classes.wait_until_synced()
            );
            if snapshots && groups {
                health_state.set_ready(true).await;
                info!("Class caches synced, webhook ready");
            } else {
                error!("Class cache stopped before syncing");
            }
        });
    }

    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    let webhook_handle = {
        let state = Arc::new(WebhookState::new(
            snapshot_classes,
            group_snapshot_classes,
            Some(health_state.clone()),
        ));
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = run_webhook_server(
                state,
                config.webhook_port,
                &config.tls_cert_path,
                &config.tls_key_path,
            )
            .await
            {
                error!("Webhook server error: {}", e);
            }
        })
    };

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = webhook_handle => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        result = snapshot_watch_handle => {
            if let Err(e) = result {
                error!("VolumeSnapshotClass watch task panicked: {}", e);
            }
        }
        result = group_snapshot_watch_handle => {
            if let Err(e) = result {
                error!("VolumeGroupSnapshotClass watch task panicked: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Fail readiness so the endpoint is removed before we exit
            health_state.set_ready(false).await;
            info!("Marked webhook as not ready");

            info!(
                "Waiting {}s for in-flight admission requests to complete...",
                SHUTDOWN_GRACE_PERIOD_SECS
            );
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Initialize the tracing subscriber in the configured format
fn init_tracing(format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::from_default_env()
        .add_directive("snapshot_validation_webhook=info".parse()?)
        .add_directive("kube=info".parse()?);

    match format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the webhook cannot shut down
/// gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

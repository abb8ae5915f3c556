// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum_server::Handle;
use secrecy::ExposeSecret;

use authgate_server::{
    api::router,
    auth::{AuthService, TokenCodec},
    clock::SystemClock,
    config::AppConfig,
    logging,
    permission::AuthenticatedOnly,
    state::AppState,
    store::InMemoryIdentityStore,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    logging::init(config.log_format)?;

    let codec = TokenCodec::new(
        config.public_key_pem.as_bytes(),
        config.private_key_pem.expose_secret().as_bytes(),
        config.lifetimes,
        Arc::new(SystemClock),
    )?;
    tracing::info!(
        access_ttl_secs = config.lifetimes.access_secs,
        refresh_ttl_secs = config.lifetimes.refresh_secs,
        "signing keys loaded"
    );

    let store = Arc::new(InMemoryIdentityStore::new());
    if let Some(seed) = &config.seed_user {
        let identity = store
            .register(&seed.email, seed.password.expose_secret(), "")
            .await?;
        tracing::info!(subject = %identity.id, "seed identity registered");
    }

    let auth = AuthService::new(Arc::new(codec), store, Arc::new(AuthenticatedOnly));
    let app = router(AppState::new(auth), config.request_timeout);

    let addr: SocketAddr = config.bind_address().parse()?;
    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    tracing::info!(%addr, "authgate listening (docs at /docs)");
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::warn!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::warn!("received SIGTERM, shutting down"),
    }
}

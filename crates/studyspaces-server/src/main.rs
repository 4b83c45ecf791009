mod api;
mod middleware;

use std::sync::Arc;

use studyspaces_core::EnrichmentPipeline;
use studyspaces_geocode::GoogleGeocoder;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, system_clock, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = studyspaces_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let geocoder = GoogleGeocoder::from_config(&config)?;
    if geocoder.is_none() {
        tracing::warn!(
            "GOOGLE_MAPS_API_KEY not set; facilities without coordinates use the fallback location"
        );
    }
    let pipeline = EnrichmentPipeline::from_config(geocoder, &config);
    tracing::info!(
        env = %config.env,
        data_path = %config.data_path.display(),
        formula = %pipeline.formula(),
        "starting study spaces server"
    );

    let auth = AuthState::from_env(matches!(
        config.env,
        studyspaces_core::Environment::Development
    ))?;
    let state = AppState {
        data_path: Arc::new(config.data_path.clone()),
        pipeline: Arc::new(pipeline),
        clock: system_clock(),
        cache_max_age_secs: config.cache_max_age_secs,
    };
    let app = build_app(state, auth, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = hunter_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let lookups = match &config.lookups_path {
        Some(path) => hunter_core::load_lookups(path)?,
        None => hunter_core::LookupTables::default(),
    };

    // A missing provider key keeps the server up; search answers
    // `configuration_error` until the key is supplied.
    let pipeline = match hunter_scraper::LeadPipeline::from_config(&config, Arc::new(lookups)) {
        Ok(pipeline) => {
            tracing::info!(provider = pipeline.provider_name(), "lead pipeline ready");
            Some(Arc::new(pipeline))
        }
        Err(e) => {
            tracing::warn!(error = %e, "lead pipeline unavailable");
            None
        }
    };

    let pool = if config.database_url.is_some() {
        let pool = hunter_db::connect_pool_from_config(&config).await?;
        let applied = hunter_db::run_migrations(&pool).await?;
        tracing::info!(applied, "database migrations up to date");
        Some(pool)
    } else {
        tracing::info!("DATABASE_URL not set; CRM endpoints disabled");
        None
    };

    let auth = AuthState::from_env(matches!(
        config.env,
        hunter_core::Environment::Development
    ))?;
    let app = build_app(AppState { pool, pipeline }, auth, default_rate_limit_state());

    tracing::info!(addr = %config.bind_addr, "agency hunter api listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
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

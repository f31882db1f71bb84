mod config;
mod error;
mod ingest;
mod server;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use claims_engine::analyzer::BatchAnalyzer;
use claims_engine::compat::PairTable;
use claims_engine::rules::RuleEvaluator;
use claims_engine::validate::Validators;

use config::Config;
use error::AppError;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_ansi(false)
        .init();

    info!("starting claims-server");

    // 1. Load config from environment
    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        max_upload_bytes = config.max_upload_bytes,
        cors_any_origin = config.cors_origins.is_none(),
        compat_table = ?config.compat_table_path,
        "configuration loaded"
    );

    // 2. Build the analyzer; immutable from here on
    let analyzer = Arc::new(build_analyzer(&config)?);
    info!(thresholds = ?analyzer.evaluator().validators().thresholds(), "analyzer ready");

    // 3. Serve HTTP until Ctrl-C
    let app = server::router(AppState::new(analyzer), &config);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
        })?;

    info!("claims-server shut down");
    Ok(())
}

fn build_analyzer(config: &Config) -> Result<BatchAnalyzer, AppError> {
    let validators = Validators::new(config.thresholds)?;
    let mut evaluator = RuleEvaluator::new(validators);

    if let Some(path) = &config.compat_table_path {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let table = PairTable::from_json(&content)?;
        if table.is_empty() {
            warn!(path = %path.display(), "compatibility table has no entries");
        }
        info!(path = %path.display(), pairs = table.len(), "compatibility table loaded");
        evaluator = evaluator.with_compatibility(Arc::new(table));
    }

    Ok(BatchAnalyzer::new(evaluator))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

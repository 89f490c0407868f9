pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod models;
pub mod patients;
pub mod report;
pub mod stats;
pub mod summary;
pub mod validation;
pub mod visits;

use tracing_subscriber::EnvFilter;

/// Start the API server with configuration from the environment and serve
/// until Ctrl-C.
pub fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env();

    // Fail fast on an unusable database path before accepting requests
    db::open_database(&config.database_path).map_err(|e| {
        format!("Cannot open database {}: {e}", config.database_path.display())
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    // the blocking AI client is built and dropped outside the runtime
    let ctx = api::ApiContext::new(config);
    runtime.block_on(api::serve_until_ctrl_c(ctx.clone()))
}

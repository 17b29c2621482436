pub mod core;
pub mod download;
pub mod extract;
pub mod pipeline;
pub mod providers;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::core::{
    config::{log_level_from_env, Config},
    errors::AppResult,
    types::RunSummary,
};
use pipeline::run_extraction;
use providers::design_api::DesignClient;

/// Installs the stderr subscriber; stdout is reserved for the run summary.
pub fn init_logging() {
    let level = log_level_from_env();
    let filter = EnvFilter::new(format!(
        "design_extract_lib={level},design_extract={level},warn"
    ));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// One batch run: read configuration, extract, download, print the summary.
pub async fn run() -> AppResult<RunSummary> {
    let config = Config::from_env()?;
    info!(?config, "starting extraction");

    let client = DesignClient::from_config(&config)?;
    let outcome = run_extraction(&client, &config).await?;

    println!("{}", serde_json::to_string(&outcome.summary)?);
    Ok(outcome.summary)
}

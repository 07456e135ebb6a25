use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod storage;
mod utils;

use api::YahooChartClient;
use config::{Config, StorageBackend};
use models::{RunReport, Window};
use services::{run_once, BackfillController};
use storage::{BlobStore, FsBlobStore, HttpBlobStore};
use utils::errors::RunError;

async fn run(config: Config) -> Result<RunReport, RunError> {
    let store: Box<dyn BlobStore> = match &config.storage {
        StorageBackend::Fs { root } => {
            info!("Using filesystem storage at {}", root);
            Box::new(FsBlobStore::new(root))
        }
        StorageBackend::Http { endpoint, token } => {
            info!("Using HTTP storage at {}", endpoint);
            Box::new(HttpBlobStore::new(
                endpoint.clone(),
                token.clone(),
                config.request_timeout,
            )?)
        }
    };

    let fetcher = YahooChartClient::new(
        config.api_base_url.clone(),
        config.symbol.clone(),
        config.request_timeout,
    )?;

    let controller = BackfillController::new(
        fetcher,
        config.breaker(),
        config.fetch_limit,
        config.request_delay,
    );

    let window = Window::through_today(config.window_start);
    run_once(store.as_ref(), &config.container, &config.key, &controller, window).await
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spx_backfill=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Backfilling {} daily closes from {} into {}/{} (limit {} fetches)",
        config.symbol, config.window_start, config.container, config.key, config.fetch_limit
    );

    match run(config).await {
        Ok(report) => info!("Backfill finished: {}", report.stop),
        Err(e) => {
            error!("Backfill failed: {}", e);
            std::process::exit(1);
        }
    }
}

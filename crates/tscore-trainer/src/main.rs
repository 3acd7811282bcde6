//! Offline trainer binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tscore_trainer::clients::{HttpThumbnailFetcher, HttpVisionClient, YouTubeCatalog};
use tscore_trainer::{pipeline, TrainerConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("tscore_trainer=info".parse().unwrap())
        .add_directive("tscore_engine=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting tscore-trainer");

    // Load configuration
    let config = TrainerConfig::from_env();
    info!("Trainer config: {:?}", config);

    // Create API clients
    let catalog = match YouTubeCatalog::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create catalog client: {}", e);
            std::process::exit(1);
        }
    };
    let fetcher = match HttpThumbnailFetcher::from_env() {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to create thumbnail fetcher: {}", e);
            std::process::exit(1);
        }
    };
    let vision = match HttpVisionClient::from_env() {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to create vision client: {}", e);
            std::process::exit(1);
        }
    };

    // Run training; Ctrl-C abandons the run before artifacts are written
    let outcome = tokio::select! {
        outcome = pipeline::run(&config, &catalog, &fetcher, &vision) => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, abandoning training run");
            std::process::exit(130);
        }
    };

    match outcome {
        Ok(summary) => {
            info!(
                run_id = %summary.run_id,
                sampled = summary.sampled_videos,
                usable = summary.usable_thumbnails,
                categories = summary.categories_analyzed,
                fallback = summary.used_fallback,
                "Training finished"
            );
        }
        Err(e) => {
            error!("Training failed: {}", e);
            std::process::exit(1);
        }
    }
}

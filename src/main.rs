//! Storyhouse - backend for the serialized-fiction platform

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyhouse::{config::Args, db::Database, server, uploads::ImageStore, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("storyhouse={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Storyhouse - serialized fiction");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Database: {:?}", args.database_path);
    info!("Uploads: {:?}", args.upload_dir);
    info!(
        "Mode: {}",
        if args.dev_mode {
            "DEVELOPMENT"
        } else {
            "PRODUCTION"
        }
    );
    info!("======================================");

    // Open the database
    let db = match Database::open(&args.database_path) {
        Ok(db) => db,
        Err(e) => {
            error!("Database open failed: {}", e);
            std::process::exit(1);
        }
    };

    // Prepare the image store
    let images = match ImageStore::new(&args.upload_dir).await {
        Ok(store) => store,
        Err(e) => {
            error!("Image store init failed: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(args, db, images));

    // Run the server
    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}

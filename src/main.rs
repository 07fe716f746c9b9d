use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

use crate::booter::Booter;
use crate::client::{Analytics, UploadForm};
use crate::config::{Config, StorageConfig};
use crate::core::encoder::JpegReencoder;
use crate::core::s3_client::S3Store;
use crate::core::storage::{ArtifactStore, LocalStore};
use crate::orchestrator::retention::spawn_retention_task;
use crate::server::build_router;
use crate::server::types::AppState;

pub mod booter;
pub mod client;
pub mod config;
pub mod core;
pub mod orchestrator;
pub mod server;
pub mod utils;

#[derive(Debug, Parser)]
#[command(name = "shrink0")]
#[command(about = "Image compression service and upload client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the compression endpoint
    Serve {
        /// Overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Upload an image to a running server and print the analytics
    Compress {
        #[arg(value_name = "FILE")]
        image: PathBuf,
        /// Passed to the server as-is
        #[arg(long, default_value = "80")]
        quality: String,
        #[arg(long, default_value = "http://localhost:8080")]
        server: Url,
        /// Save the compressed artifact into this directory
        #[arg(long, value_name = "DIR")]
        download: Option<PathBuf>,
    },
}

// Build the artifact store from config
fn init_store(config: &Config) -> Arc<dyn ArtifactStore> {
    match &config.storage {
        StorageConfig::Local { dir, public_url } => {
            tracing::info!(dir = %dir.display(), %public_url, "using local artifact store");
            Arc::new(LocalStore::new(dir.clone(), public_url.clone()))
        }
        StorageConfig::S3(settings) => {
            tracing::info!(bucket = %settings.bucket_name, "using s3 artifact store");
            Arc::new(S3Store::new(settings))
        }
    }
}

async fn serve(port: Option<u16>) -> Result<(), anyhow::Error> {
    let config = Config::from_env(port)?;
    let store = init_store(&config);

    let _retention = config
        .retention
        .map(|retention| spawn_retention_task(store.clone(), retention));

    let state = Arc::new(AppState::new(
        Arc::new(JpegReencoder::new()),
        store,
        config.max_image_bytes,
    ));
    let router = build_router(state, config.request_timeout);

    Booter::new(config.port).await?.start(router).await
}

async fn compress(
    image: PathBuf,
    quality: String,
    server: Url,
    download: Option<PathBuf>,
) -> Result<(), anyhow::Error> {
    let form = UploadForm::new(&server)?;
    form.select_image(image);
    form.set_quality(quality);

    let result = form.compress().await?;
    println!("{}", Analytics(&result));

    if let Some(dir) = download {
        if let Some(path) = form.download(&dir).await? {
            println!("Saved to {}", path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shrink0=info,tower_http=info".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Serve { port } => serve(port).await,
        Command::Compress {
            image,
            quality,
            server,
            download,
        } => compress(image, quality, server, download).await,
    }
}

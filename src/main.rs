//! Photomosaic - turn photos into mosaics of tile images.
//!
//! This binary loads the tile corpus and starts the HTTP server.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photomosaic::{
    config::Config,
    mosaic::{Compositor, TileCorpus},
    server::{create_router, RouterConfig},
    source::LocalTileSource,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Photomosaic v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Tiles directory: {}", config.tiles_dir.display());
    info!(
        "  Cell size: {} (max {})",
        config.cell_size, config.max_cell_size
    );
    info!(
        "  Region grid: {}x{}, sampling {:?}",
        config.grid_columns, config.grid_rows, config.sampling
    );
    match config.request_timeout() {
        Some(timeout) => info!("  Request timeout: {}s", timeout.as_secs()),
        None => info!("  Request timeout: disabled"),
    }
    if config.strict_tiles {
        info!("  Unreadable tiles fail the mosaic");
    }

    // Build the tile corpus once; every request reserves from a copy of it
    let source = LocalTileSource::new(&config.tiles_dir);
    info!("");
    info!("Loading tiles...");
    let corpus = match TileCorpus::load(&source).await {
        Ok(corpus) => corpus,
        Err(e) => {
            error!(
                "Failed to read tiles directory {}: {}",
                config.tiles_dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    if corpus.is_empty() {
        warn!("  No usable tiles found; every upload will fail");
    } else {
        info!("  Loaded {} tile(s)", corpus.len());
    }

    let compositor = Compositor::new(corpus, source).with_options(config.mosaic_options());
    let router = create_router(compositor, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Open the upload page:");
    info!("    open http://{}/", addr);
    info!("  Or post a photo directly:");
    info!(
        "    curl -F image=@photo.jpg http://{}/upload -o mosaic.jpg",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "photomosaic=debug,tower_http=debug"
    } else {
        "photomosaic=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_default_cell_size(config.cell_size)
        .with_max_cell_size(config.max_cell_size)
        .with_jpeg_quality(config.jpeg_quality)
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    if config.static_dir.is_dir() {
        router_config = router_config.with_static_dir(&config.static_dir);
    } else {
        info!(
            "  Static directory {} not found; /static disabled",
            config.static_dir.display()
        );
    }

    router_config
}

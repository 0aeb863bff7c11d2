// src/main.rs - Kiosk host entry point
use clap::Parser;
use std::sync::Arc;

use revive_kiosk::config::{self, Config};
use revive_kiosk::document::ScratchStore;
use revive_kiosk::intake::api::{AppState, create_router};
use revive_kiosk::kiosk::{Kiosk, KioskError};
use revive_kiosk::preview::PdfiumRenderer;
use revive_kiosk::spooler::Spooler;
use revive_kiosk::spooler::cups::CupsClient;

#[derive(Parser)]
#[command(name = "kiosk-host", version, about = "Revive Print Kiosk host")]
struct Cli {
    /// Path to the kiosk configuration file
    #[arg(default_value = "kiosk.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), KioskError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting Revive Print Kiosk host");

    // Kiosks boot unattended; a missing config file means defaults, not a crash.
    let config = if std::path::Path::new(&cli.config).exists() {
        config::load_config(&cli.config).map_err(|e| {
            tracing::error!("Failed to load config from '{}': {}", cli.config, e);
            e
        })?
    } else {
        tracing::warn!("Configuration file '{}' not found, using defaults", cli.config);
        Config::default()
    };

    tracing::info!("Printer: {}", config.printer.name);
    tracing::info!("Upload page: {}", config.kiosk.qr_url);

    let store = match &config.intake.scratch_dir {
        Some(dir) => ScratchStore::at(dir.clone())?,
        None => ScratchStore::new()?,
    };
    let store = Arc::new(store);
    tracing::info!("Scratch directory: {}", store.dir().display());

    // A dead spooler is not fatal; printing fails fast until it returns.
    let spooler: Arc<dyn Spooler> = Arc::new(CupsClient::new());
    match spooler.printers().await {
        Ok(printers) if !printers.iter().any(|p| p == &config.printer.name) => {
            tracing::warn!(
                "Printer '{}' not found in spooler (available: {:?})",
                config.printer.name,
                printers
            );
        }
        Ok(_) => tracing::info!("Print spooler reachable"),
        Err(e) => {
            tracing::warn!("Print spooler unreachable: {e}; printing will fail until it returns")
        }
    }

    let renderer = Arc::new(PdfiumRenderer::new(config.preview.dpi));
    let bind = format!("{}:{}", config.intake.bind_address, config.intake.port);
    let (mut kiosk, events_tx) = Kiosk::new(config, spooler, renderer);

    let app = create_router(AppState { events: events_tx, store });
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("File receiver listening on http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Intake server error: {e}");
        }
    });

    kiosk.run().await;
    Ok(())
}

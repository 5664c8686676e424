//! Stock Viewer - OHLC candlestick chart and CSV export client
//!
//! Fetches aggregated stock data from the chart-data backend and displays
//! it as an interactive candlestick chart with an optional volume subplot.

mod api;
mod charts;
mod config;
mod data;
mod gui;

use anyhow::Context;
use api::{ChartDataClient, ChartDataSource};
use config::AppConfig;
use eframe::egui;
use gui::StockViewerApp;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    let client = ChartDataClient::new(&config).context("Failed to create HTTP client")?;
    let source: Arc<dyn ChartDataSource> = Arc::new(client);

    tracing::info!(base_url = %config.base_url, "Using chart data backend");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Stock Viewer"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Stock Viewer",
        options,
        Box::new(move |cc| Ok(Box::new(StockViewerApp::new(cc, &config, source)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run UI: {e}"))
}

mod app;
mod color;
mod ui;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use app::TradeDashboardApp;
use clap::Parser;
use eframe::egui;
use log::LevelFilter;

use trade_dashboard::config::Args;
use trade_dashboard::data::loader::load_dataset;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.log_level());

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Exiting with error: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(args: Args) -> Result<()> {
    let load_options = args.load_options();
    log::debug!("{args:?}");

    // The dataset is loaded once, before any window opens; a bad source aborts startup.
    let dataset = load_dataset(args.data(), &load_options)
        .with_context(|| format!("loading {}", args.data().display()))?;
    let dataset = Arc::new(dataset);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Imports and Exports Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(TradeDashboardApp::new(dataset, load_options)))),
    )
    .map_err(|e| anyhow!("{e}"))
}

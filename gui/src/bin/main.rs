//! Classification viewer and benchmark table for egui

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use anyhow::Context;
use pipbench_core::HarnessConfig;

fn main() -> anyhow::Result<()> {
    let config = HarnessConfig::load(None).context("failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(family = %config.family, trials = config.trials, "starting viewer");

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "pipbench",
        options,
        Box::new(move |_cc| Ok(Box::new(pipbench_gui::MyApp::new(&config)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with error: {e}"))
}

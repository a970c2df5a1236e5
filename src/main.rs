mod app;
mod cli;
mod color;
mod data;
mod query;
mod state;
mod ui;

use anyhow::{anyhow, Context, Result};
use app::SalaryDashboardApp;
use cli::Args;
use eframe::egui;
use state::DashboardState;

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse_args();
    if let Err(e) = args.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    log::debug!("Arguments: {args:?}");

    // The dashboard cannot show anything without its dataset: fail before opening a window.
    let dataset = match data::loader::load_file(&args.dataset)
        .with_context(|| format!("loading {}", args.dataset.display()))
    {
        Ok(dataset) => dataset,
        Err(e) => {
            log::error!("Failed to load dataset: {e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let state = DashboardState::new(dataset, args.dataset.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Salary Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(SalaryDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("window closed with an error: {e}"))
}

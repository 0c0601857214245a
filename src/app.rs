use std::sync::Arc;

use eframe::egui;

use trade_dashboard::data::loader::LoadOptions;
use trade_dashboard::data::model::TradeDataset;
use trade_dashboard::state::AppState;

use crate::color::ChartColors;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TradeDashboardApp {
    pub state: AppState,
    /// Reused for every File → Open… load.
    load_options: LoadOptions,
    colors: ChartColors,
}

impl TradeDashboardApp {
    pub fn new(dataset: Arc<TradeDataset>, load_options: LoadOptions) -> Self {
        let colors = ChartColors::new(&dataset);
        let mut state = AppState::default();
        state.set_dataset(dataset);
        Self {
            state,
            load_options,
            colors,
        }
    }
}

impl eframe::App for TradeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            if panels::top_bar(ui, &mut self.state, &self.load_options) {
                if let Some(ds) = &self.state.dataset {
                    self.colors = ChartColors::new(ds);
                }
            }
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.colors);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state, &self.colors);
        });
    }
}

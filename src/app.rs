use eframe::egui;

use crate::config::PipelineConfig;
use crate::session::Session;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GeologApp {
    pub session: Session,
}

impl GeologApp {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            session: Session::new(config),
        }
    }
}

impl eframe::App for GeologApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + plot button ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.session);
        });

        // ---- Left side panel: feature selection ----
        egui::SidePanel::left("feature_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session);
            });

        // ---- Central panel: depth plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::depth_plot(ui, &self.session);
        });
    }
}

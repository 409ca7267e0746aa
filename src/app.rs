use eframe::egui;

use crate::state::{AppState, ChartTab};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ClimateLensApp {
    pub state: AppState,
}

impl ClimateLensApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ClimateLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: chart navigation ----
        egui::SidePanel::left("chart_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &self.state;
            let Some(charts) = &state.charts else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open an indicator file to build charts  (File → Open data…)");
                });
                return;
            };
            match state.tab {
                ChartTab::Summary => {
                    egui::ScrollArea::both().show(ui, |ui| {
                        panels::summary_view(ui, &charts.summary, &charts.description);
                    });
                }
                ChartTab::Heatmap => plot::heatmap(ui, &charts.heatmap),
                ChartTab::Lines => match charts.lines.get(state.line_index) {
                    Some(chart) => plot::line_chart(ui, chart),
                    None => {
                        ui.label("No line charts configured.");
                    }
                },
                ChartTab::Bars => plot::bar_chart(ui, &charts.bars),
                ChartTab::Pies => match charts.pies.get(state.pie_index) {
                    Some(chart) => plot::pie_chart(ui, chart),
                    None => {
                        ui.label("No pie charts configured.");
                    }
                },
            }
        });
    }
}

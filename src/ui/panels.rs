use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use climate_lens::config::ChartConfig;
use climate_lens::data::summary::{Description, SummaryTable, STAT_ROWS};

use crate::state::{AppState, ChartTab};

// ---------------------------------------------------------------------------
// Left side panel – chart navigation
// ---------------------------------------------------------------------------

/// Render the left navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Charts");
    ui.separator();

    for tab in ChartTab::ALL {
        ui.selectable_value(&mut state.tab, tab, tab.label());
    }
    ui.separator();

    let Some(charts) = &state.charts else {
        ui.label("No charts built.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.tab {
            ChartTab::Lines => {
                ui.strong("Indicator");
                for (i, chart) in charts.lines.iter().enumerate() {
                    ui.selectable_value(&mut state.line_index, i, chart.y_label.as_str());
                }
            }
            ChartTab::Pies => {
                ui.strong("Year");
                for (i, year) in state.config.bar_years.iter().enumerate() {
                    ui.selectable_value(&mut state.pie_index, i, year.as_str());
                }
            }
            ChartTab::Heatmap => {
                ui.strong("Countries");
                for country in &state.config.correlation.countries {
                    ui.label(country.as_str());
                }
                ui.label(format!("Reference year {}", state.config.correlation.reference_year));
            }
            ChartTab::Summary | ChartTab::Bars => {
                ui.strong("Countries");
                for country in &state.config.countries {
                    ui.label(country.as_str());
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Load chart config…").clicked() {
                open_config_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reset chart config").clicked() {
                state.set_config(ChartConfig::default());
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            let name = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} rows, {} columns",
                table.len(),
                table.columns().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open indicator data")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn open_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open chart configuration")
        .add_filter("JSON", &["json"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    match ChartConfig::from_path(&path).with_context(|| format!("loading {}", path.display())) {
        Ok(config) => {
            log::info!("Loaded chart config from {}", path.display());
            state.set_config(config);
        }
        Err(e) => {
            log::error!("Failed to load config: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Summary tab
// ---------------------------------------------------------------------------

fn cell_text(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"))
}

/// Summary table followed by per-year descriptive statistics.
pub fn summary_view(ui: &mut Ui, summary: &SummaryTable, description: &Description) {
    ui.heading("Summary");
    ui.push_id("summary_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(140.0))
            .columns(Column::auto().at_least(110.0), summary.columns.len())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("Country");
                });
                for year in summary.years() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(year);
                    });
                }
            })
            .body(|mut body| {
                for (i, label) in summary.labels.iter().enumerate() {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(label.as_str());
                        });
                        for (_, values) in &summary.columns {
                            row.col(|ui: &mut Ui| {
                                ui.monospace(cell_text(values.get(i).copied().flatten()));
                            });
                        }
                    });
                }
            });
    });

    ui.add_space(16.0);
    ui.heading("Statistics");
    ui.push_id("describe_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(60.0))
            .columns(Column::auto().at_least(110.0), description.columns.len())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("");
                });
                for c in &description.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(c.column.as_str());
                    });
                }
            })
            .body(|mut body| {
                for (name, get) in STAT_ROWS {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(name);
                        });
                        for c in &description.columns {
                            row.col(|ui: &mut Ui| {
                                ui.monospace(cell_text(get(c)));
                            });
                        }
                    });
                }
            });
    });
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use climate_lens::charts::{build_charts, ChartSet};
use climate_lens::config::ChartConfig;
use climate_lens::data::loader::load_file;
use climate_lens::data::Table;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which chart the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartTab {
    Summary,
    Heatmap,
    Lines,
    Bars,
    Pies,
}

impl ChartTab {
    pub const ALL: [ChartTab; 5] = [
        ChartTab::Summary,
        ChartTab::Heatmap,
        ChartTab::Lines,
        ChartTab::Bars,
        ChartTab::Pies,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartTab::Summary => "Summary",
            ChartTab::Heatmap => "Heatmap",
            ChartTab::Lines => "Line charts",
            ChartTab::Bars => "Bar chart",
            ChartTab::Pies => "Pie charts",
        }
    }
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until user loads a file).
    pub table: Option<Table>,

    /// Where the table came from.
    pub source: Option<PathBuf>,

    /// Years, countries and indicators for every chart.
    pub config: ChartConfig,

    /// Charts built from the current table (None when the build failed).
    pub charts: Option<ChartSet>,

    pub tab: ChartTab,

    /// Selected line chart / pie chart.
    pub line_index: usize,
    pub pie_index: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            table: None,
            source: None,
            config,
            charts: None,
            tab: ChartTab::Summary,
            line_index: 0,
            pie_index: 0,
            status_message: None,
        }
    }

    /// Load a table from disk and rebuild every chart.
    pub fn open(&mut self, path: &Path) {
        let result = load_file(path, self.config.header_lines)
            .with_context(|| format!("loading {}", path.display()));
        match result {
            Ok((table, transposed)) => {
                log::info!(
                    "Loaded {} rows; transposed view has {} entries",
                    table.len(),
                    transposed.len()
                );
                self.source = Some(path.to_path_buf());
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table and build the chart set.
    pub fn set_table(&mut self, table: Table) {
        self.table = Some(table);
        self.line_index = 0;
        self.pie_index = 0;
        self.rebuild();
    }

    /// Rebuild charts from the current table and config.
    pub fn rebuild(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        match build(table, &self.config) {
            Ok(charts) => {
                self.charts = Some(charts);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to build charts: {e:#}");
                self.charts = None;
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn set_config(&mut self, config: ChartConfig) {
        self.config = config;
        self.rebuild();
    }
}

fn build(table: &Table, config: &ChartConfig) -> Result<ChartSet> {
    build_charts(table, config).context("building charts")
}

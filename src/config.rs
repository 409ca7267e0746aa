use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::error::{DataError, LoadContext, Result};
use crate::data::loader::DEFAULT_HEADER_LINES;
use crate::data::pivot::AttributeLabeling;
use crate::data::series::GapPolicy;

// ---------------------------------------------------------------------------
// Chart configuration
// ---------------------------------------------------------------------------

/// Everything the chart pipeline needs besides the table itself.
///
/// `Default` reproduces the stock World Bank climate report; any field can
/// be overridden from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Preamble lines before the CSV header row.
    pub header_lines: usize,
    /// Years plotted by the line charts.
    pub years: Vec<String>,
    /// Years plotted by the bar and pie charts.
    pub bar_years: Vec<String>,
    pub countries: Vec<String>,
    pub gap_policy: GapPolicy,
    pub summary: SummaryConfig,
    pub correlation: CorrelationConfig,
    pub line_charts: Vec<LineChartConfig>,
    pub bar_chart: BarChartConfig,
    pub pie_chart: PieChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub indicator: String,
    /// Fixed row labels; `None` labels rows by their Country Name.
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub countries: Vec<String>,
    pub indicators: Vec<String>,
    pub reference_year: String,
    pub labeling: AttributeLabeling,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChartConfig {
    pub indicator: String,
    pub y_label: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarChartConfig {
    pub indicator: String,
    pub axis_label: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieChartConfig {
    pub indicator: String,
    /// Title prefix; the sliced year is appended.
    pub title: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            header_lines: DEFAULT_HEADER_LINES,
            years: strings(&["1980", "1990", "2000", "2010", "2015", "2020"]),
            bar_years: strings(&["1990", "2000", "2005", "2010", "2015", "2020"]),
            countries: strings(&[
                "United Kingdom",
                "United States",
                "India",
                "Australia",
                "Canada",
                "Singapore",
            ]),
            gap_policy: GapPolicy::default(),
            summary: SummaryConfig::default(),
            correlation: CorrelationConfig::default(),
            line_charts: vec![
                LineChartConfig {
                    indicator: "AG.LND.PRCP.MM".into(),
                    y_label: "Average precipitation in depth (mm per year)".into(),
                    title: "Average precipitation of different countries in different years"
                        .into(),
                },
                LineChartConfig {
                    indicator: "AG.LND.AGRI.ZS".into(),
                    y_label: "Agricultural land (% of land area)".into(),
                    title: "Total Agricultural land of different countries in different years"
                        .into(),
                },
            ],
            bar_chart: BarChartConfig::default(),
            pie_chart: PieChartConfig::default(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            indicator: "SP.POP.TOTL".into(),
            labels: Some(strings(&[
                "United Kingdom",
                "United States",
                "India",
                "Australia",
                "Canada",
            ])),
        }
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            countries: strings(&["United States", "United Kingdom", "India"]),
            indicators: strings(&[
                "AG.LND.ARBL.ZS",
                "AG.LND.AGRI.ZS",
                "AG.LND.FRST.ZS",
                "AG.LND.IRIG.AG.ZS",
                "EG.ELC.ACCS.ZS",
                "BX.KLT.DINV.WD.GD.ZS",
            ]),
            reference_year: "2010".into(),
            labeling: AttributeLabeling::default(),
            title: "Correlation Heatmap of Countries with Indicators as features".into(),
        }
    }
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            indicator: "AG.YLD.CREL.KG".into(),
            axis_label: "Cereal yield (kg per hectare)".into(),
            title: "Cereal yield of different countries".into(),
        }
    }
}

impl Default for PieChartConfig {
    fn default() -> Self {
        Self {
            indicator: "AG.LND.AGRI.K2".into(),
            title: "Agricultural land (sq. km) in".into(),
        }
    }
}

impl ChartConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .load_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| DataError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no chart could be built from.
    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() || self.bar_years.is_empty() {
            return Err(DataError::Config("year lists must not be empty".into()));
        }
        if self.countries.is_empty() {
            return Err(DataError::Config("country list must not be empty".into()));
        }
        if self.correlation.indicators.len() < 2 {
            return Err(DataError::Config(
                "correlation needs at least two indicators".into(),
            ));
        }
        Ok(())
    }
}

//! Chart pipeline: turns the loaded table into the shaped inputs each
//! chart renderer consumes.
//!
//! The build is all-or-nothing; the first failing chart aborts it.

use crate::config::ChartConfig;
use crate::data::filter::{filter_by_countries, filter_by_indicator, project_years};
use crate::data::pivot::{build_correlation, CorrelationMatrix};
use crate::data::series::{extract_series, BarRow, CountrySeries, PieSlice};
use crate::data::summary::{build_summary, describe, Description, SummaryTable, SUMMARY_SIZE};
use crate::data::{Result, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub matrix: CorrelationMatrix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub y_label: String,
    pub years: Vec<String>,
    pub series: CountrySeries,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub axis_label: String,
    /// Categorical axis labels, one per value position.
    pub categories: Vec<String>,
    pub rows: Vec<BarRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

/// Everything the viewer shows for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub summary: SummaryTable,
    pub description: Description,
    pub heatmap: Heatmap,
    pub lines: Vec<LineChart>,
    pub bars: BarChart,
    pub pies: Vec<PieChart>,
}

/// Build every chart in report order: summary, heatmap, lines, bars, pies.
pub fn build_charts(table: &Table, config: &ChartConfig) -> Result<ChartSet> {
    let (summary, description) = build_summary_section(table, config)?;
    log::info!("Summary for {} built", config.summary.indicator);

    let heatmap = build_heatmap(table, config)?;
    log::info!(
        "Correlation heatmap over {} attributes built",
        heatmap.matrix.len()
    );

    // Line, bar and pie charts only ever read the configured countries.
    let scoped = filter_by_countries(table, &config.countries);
    log::debug!(
        "{} of {} rows belong to the charted countries",
        scoped.len(),
        table.len()
    );

    let lines = config
        .line_charts
        .iter()
        .map(|line| {
            let series = extract_series(
                &scoped,
                &line.indicator,
                &config.years,
                &config.countries,
                config.gap_policy,
            );
            log::info!("Line chart {} with {} series", line.indicator, series.len());
            LineChart {
                title: line.title.clone(),
                y_label: line.y_label.clone(),
                years: config.years.clone(),
                series,
            }
        })
        .collect();

    let bars = build_bar_chart(&scoped, config);
    log::info!("Bar chart {} with {} groups", config.bar_chart.indicator, bars.rows.len());

    let pies = build_pie_charts(&scoped, config);
    log::info!("{} pie charts for {}", pies.len(), config.pie_chart.indicator);

    Ok(ChartSet {
        summary,
        description,
        heatmap,
        lines,
        bars,
        pies,
    })
}

/// Filter to the summary indicator, keep the first five years, then
/// describe and tabulate.
pub fn build_summary_section(
    table: &Table,
    config: &ChartConfig,
) -> Result<(SummaryTable, Description)> {
    let years: Vec<&String> = config.years.iter().take(SUMMARY_SIZE).collect();
    let filtered = project_years(&filter_by_indicator(table, &config.summary.indicator), &years);
    let description = describe(&filtered);
    log::info!("Summary statistics:\n{description}");
    let summary = build_summary(&filtered, &years, config.summary.labels.as_deref())?;
    log::info!("Summary table:\n{summary}");
    Ok((summary, description))
}

pub fn build_heatmap(table: &Table, config: &ChartConfig) -> Result<Heatmap> {
    let c = &config.correlation;
    let matrix = build_correlation(
        table,
        &c.countries,
        &c.indicators,
        &c.reference_year,
        c.labeling,
    )?;
    Ok(Heatmap {
        title: c.title.clone(),
        matrix,
    })
}

pub fn build_bar_chart(table: &Table, config: &ChartConfig) -> BarChart {
    let series = extract_series(
        table,
        &config.bar_chart.indicator,
        &config.bar_years,
        &config.countries,
        config.gap_policy,
    );
    BarChart {
        title: config.bar_chart.title.clone(),
        axis_label: config.bar_chart.axis_label.clone(),
        categories: config.bar_years.clone(),
        rows: series.to_bar_rows(),
    }
}

/// One pie per bar year: each country's share of the indicator in that year.
pub fn build_pie_charts(table: &Table, config: &ChartConfig) -> Vec<PieChart> {
    let series = extract_series(
        table,
        &config.pie_chart.indicator,
        &config.bar_years,
        &config.countries,
        config.gap_policy,
    );
    series
        .years()
        .iter()
        .enumerate()
        .map(|(i, year)| PieChart {
            title: format!("{} {year}", config.pie_chart.title),
            slices: series.slice_at(i),
        })
        .collect()
}

use std::f64::consts::TAU;

use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoint, PlotPoints, Points,
    Polygon, Text,
};

use climate_lens::charts::{self, Heatmap, LineChart, PieChart};

use crate::color::{chart_color, contrast_text, generate_palette, heat_color};

/// Label for a categorical axis position, if the grid mark sits on one.
fn category_label(categories: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Annotated correlation grid: row `i` drawn top-down, one square per pair.
pub fn heatmap(ui: &mut Ui, chart: &Heatmap) {
    ui.heading(chart.title.as_str());
    let matrix = &chart.matrix;
    let n = matrix.len();

    Plot::new("heatmap")
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for i in 0..n {
                let top = (n - i) as f64;
                for j in 0..n {
                    let value = matrix.get(i, j).unwrap_or(f64::NAN);
                    let fill = heat_color(value);
                    let left = j as f64;
                    let square: PlotPoints = vec![
                        [left, top],
                        [left + 1.0, top],
                        [left + 1.0, top - 1.0],
                        [left, top - 1.0],
                    ]
                    .into();
                    plot_ui.polygon(
                        Polygon::new(square)
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, Color32::BLACK)),
                    );
                    let text = if value.is_nan() {
                        "NaN".to_string()
                    } else {
                        format!("{value:.2}")
                    };
                    plot_ui.text(
                        Text::new(PlotPoint::new(left + 0.5, top - 0.5), text)
                            .color(contrast_text(fill)),
                    );
                }
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(-0.1, top - 0.5),
                        format!("[{}] {}", i + 1, matrix.labels[i]),
                    )
                    .anchor(Align2::RIGHT_CENTER),
                );
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64 + 0.5, -0.1), format!("[{}]", i + 1))
                        .anchor(Align2::CENTER_TOP),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Multi-series line chart
// ---------------------------------------------------------------------------

/// One dash-dot line with star markers per country; years are categorical.
pub fn line_chart(ui: &mut Ui, chart: &LineChart) {
    ui.heading(chart.title.as_str());
    if chart.series.is_empty() {
        ui.label("No series for the selected countries.");
        return;
    }
    let colors = generate_palette(chart.series.len());
    let years = chart.years.clone();

    Plot::new(("line_chart", &chart.title))
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(chart.y_label.as_str())
        .x_axis_formatter(move |mark, _range| category_label(&years, mark.value))
        .show(ui, |plot_ui| {
            for ((country, values), color) in chart.series.iter().zip(colors) {
                let points: Vec<[f64; 2]> = values
                    .iter()
                    .enumerate()
                    .filter_map(|(x, v)| v.map(|y| [x as f64, y]))
                    .collect();
                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(country)
                        .color(color)
                        .style(LineStyle::dashed_dense())
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(country)
                        .color(color)
                        .shape(MarkerShape::Asterisk)
                        .radius(4.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Grouped horizontal bar chart
// ---------------------------------------------------------------------------

const BAR_WIDTH: f64 = 0.1;

/// One horizontal bar group per year, one bar per country within the group.
pub fn bar_chart(ui: &mut Ui, chart: &charts::BarChart) {
    ui.heading(chart.title.as_str());
    if chart.rows.is_empty() {
        ui.label("No data for the selected countries.");
        return;
    }
    let categories = chart.categories.clone();

    Plot::new("bar_chart")
        .legend(Legend::default())
        .x_axis_label(chart.axis_label.as_str())
        .y_axis_label("Year")
        .y_axis_formatter(move |mark, _range| category_label(&categories, mark.value))
        .show(ui, |plot_ui| {
            for (i, row) in chart.rows.iter().enumerate() {
                let bars: Vec<Bar> = row
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(k, v)| {
                        v.map(|v| Bar::new(k as f64 + i as f64 * BAR_WIDTH, v).width(BAR_WIDTH))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .horizontal()
                        .color(chart_color(i))
                        .name(&row.label),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

const START_ANGLE_DEG: f64 = 140.0;
const ARC_STEPS_PER_TURN: f64 = 180.0;

/// Counter-clockwise wedges from 140°, each labelled with its share.
pub fn pie_chart(ui: &mut Ui, chart: &PieChart) {
    ui.heading(chart.title.as_str());
    let total = chart.total();
    if chart.slices.is_empty() || total <= 0.0 {
        ui.label(RichText::new("No positive values to chart for this year.").italics());
        return;
    }

    Plot::new(("pie_chart", &chart.title))
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut start = START_ANGLE_DEG.to_radians();
            for (i, slice) in chart.slices.iter().enumerate() {
                let sweep = slice.value / total * TAU;
                let steps = ((sweep / TAU) * ARC_STEPS_PER_TURN).ceil().max(1.0) as usize;
                let mut wedge = vec![[0.0, 0.0]];
                wedge.extend((0..=steps).map(|s| {
                    let a = start + sweep * s as f64 / steps as f64;
                    [a.cos(), a.sin()]
                }));
                let color = chart_color(i);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(wedge))
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::WHITE))
                        .name(&slice.label),
                );

                let mid = start + sweep / 2.0;
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                        RichText::new(format!("{:.1}%", slice.value / total * 100.0)).strong(),
                    )
                    .color(Color32::BLACK),
                );
                start += sweep;
            }
        });
}

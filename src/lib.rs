//! Climate indicator explorer: loads a World Bank style indicator table
//! and reshapes it into the inputs of a correlation heatmap, line charts,
//! a grouped bar chart, pie charts and a summary table.

pub mod charts;
pub mod config;
pub mod data;

pub mod chart;
pub mod display;
pub mod table;

use crate::config::{self, Config};

/// Text and layout shared by the PNG chart and the terminal chart.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// False when no font could be loaded; the PNG then carries bars and axes only.
    pub with_text: bool,
}

impl ChartStyle {
    pub fn from_config(cfg: &Config, with_text: bool) -> Self {
        Self {
            title: cfg.chart_title(),
            x_label: config::chart::X_LABEL,
            y_label: config::chart::Y_LABEL,
            with_text,
        }
    }
}

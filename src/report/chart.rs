use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;

use crate::aggregate::ReportRow;
use crate::config::chart::{HEIGHT_PX, WIDTH_PX};
use crate::error::{AppError, Result};
use crate::report::ChartStyle;

const FONT_FAMILY: &str = "sans-serif";

/// Load a TrueType font for chart text. Must succeed before a chart is
/// rendered with `ChartStyle::with_text`.
pub fn register_font<P: AsRef<Path>>(path: P) -> Result<()> {
    let bytes = std::fs::read(path)?;
    // plotters keeps registered fonts for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| AppError::Chart("font file is not a usable TrueType font".to_string()))
}

/// Render the report as a bar chart PNG at `path`, replacing any previous
/// file. Bars follow row order and fill their whole slot.
pub fn render_png<P: AsRef<Path>>(path: P, rows: &[ReportRow], style: &ChartStyle) -> Result<()> {
    let root = BitMapBackend::new(path.as_ref(), (WIDTH_PX, HEIGHT_PX)).into_drawing_area();
    draw(&root, rows, style).map_err(|e| AppError::Chart(e.to_string()))
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    rows: &[ReportRow],
    style: &ChartStyle,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    // An empty report still gets one empty slot so the axes have a range.
    let slots = rows.len().max(1);
    let y_max = rows.iter().map(|r| r.null_count).max().unwrap_or(0) + 1;

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60);
    if style.with_text {
        builder.caption(style.title.as_str(), (FONT_FAMILY, 28));
    }
    let mut chart = builder.build_cartesian_2d((0..slots).into_segmented(), 0u32..y_max)?;

    if style.with_text {
        let ticker_label = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => rows.get(*i).map(|r| r.ticker.clone()).unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(slots)
            .x_label_formatter(&ticker_label)
            .x_desc(style.x_label)
            .y_desc(style.y_label)
            .axis_desc_style((FONT_FAMILY, 18))
            .draw()?;
    }

    // Axis lines carry no text and are drawn in both modes.
    let (x_px, y_px) = chart.plotting_area().get_pixel_range();
    root.draw(&PathElement::new(
        vec![
            (x_px.start, y_px.start),
            (x_px.start, y_px.end - 1),
            (x_px.end - 1, y_px.end - 1),
        ],
        &BLACK,
    ))?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(GREEN.filled())
            .margin(0)
            .data(rows.iter().enumerate().map(|(i, r)| (i, r.null_count))),
    )?;

    root.present()?;
    Ok(())
}

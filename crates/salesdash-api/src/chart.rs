//! SVG chart rendering with plotters

use plotters::coord::Shift;
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use salesdash_config::{ChartConfig, ChartType};
use salesdash_core::{ChartData, ChartSeries, CHART_X_LABEL, CHART_Y_LABEL};
use std::collections::HashMap;

/// Share of a month slot covered by its bars
const BAR_GROUP_WIDTH: f64 = 0.8;

/// Size and palette for rendered charts
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<RGBColor>,
}

impl ChartStyle {
    pub fn from_config(config: &ChartConfig) -> Self {
        let mut palette: Vec<RGBColor> = config
            .palette_rgb()
            .into_iter()
            .map(|(r, g, b)| RGBColor(r, g, b))
            .collect();
        if palette.is_empty() {
            palette.push(BLUE);
        }
        Self {
            width: config.width,
            height: config.height,
            palette,
        }
    }

    /// Palette colors repeat once there are more locations than entries
    pub fn color(&self, index: usize) -> RGBColor {
        self.palette[index % self.palette.len()]
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::from_config(&ChartConfig::default())
    }
}

/// Render the chart as a standalone SVG document
pub fn render_svg(chart: &ChartData, style: &ChartStyle) -> Result<String, String> {
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, (style.width, style.height)).into_drawing_area();
        draw_chart(&root, chart, style).map_err(|e| e.to_string())?;
        root.present().map_err(|e| e.to_string())?;
    }
    Ok(buffer)
}

fn draw_chart(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    chart: &ChartData,
    style: &ChartStyle,
) -> Result<(), Box<dyn std::error::Error>> {
    root.fill(&WHITE)?;

    let months = &chart.months;
    let slots = months.len().max(1);
    let (low, high) = chart.value_range();
    let (y_min, y_max) = padded_range(low.to_f64().unwrap_or(0.0), high.to_f64().unwrap_or(0.0));

    let mut builder = ChartBuilder::on(root)
        .caption(&chart.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..(slots as f64 - 0.5), y_min..y_max)?;

    let month_label = |x: &f64| {
        let index = x.round();
        if (x - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        months.get(index as usize).cloned().unwrap_or_default()
    };

    builder
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots * 2 + 1)
        .x_label_formatter(&month_label)
        .x_desc(CHART_X_LABEL)
        .y_desc(CHART_Y_LABEL)
        .draw()?;

    let positions: HashMap<&str, f64> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (m.as_str(), i as f64))
        .collect();

    match chart.chart_type {
        ChartType::Bar => draw_bars(&mut builder, &chart.series, &positions, style)?,
        ChartType::Line => draw_lines(&mut builder, &chart.series, &positions, style)?,
    }

    if !chart.series.is_empty() {
        builder
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    Ok(())
}

type Chart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>>;

fn draw_bars(
    chart: &mut Chart<'_, '_>,
    series: &[ChartSeries],
    positions: &HashMap<&str, f64>,
    style: &ChartStyle,
) -> Result<(), Box<dyn std::error::Error>> {
    let width = BAR_GROUP_WIDTH / series.len().max(1) as f64;
    for (slot, s) in series.iter().enumerate() {
        let color = style.color(s.color_index);
        let offset = -BAR_GROUP_WIDTH / 2.0 + slot as f64 * width;
        let bars: Vec<(f64, f64)> = points(s, positions);
        chart
            .draw_series(bars.into_iter().map(|(x, y)| {
                Rectangle::new([(x + offset, 0.0), (x + offset + width, y)], color.filled())
            }))?
            .label(s.location.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }
    Ok(())
}

fn draw_lines(
    chart: &mut Chart<'_, '_>,
    series: &[ChartSeries],
    positions: &HashMap<&str, f64>,
    style: &ChartStyle,
) -> Result<(), Box<dyn std::error::Error>> {
    for s in series {
        let color = style.color(s.color_index);
        let line = points(s, positions);
        chart
            .draw_series(LineSeries::new(line.iter().copied(), color.stroke_width(2)))?
            .label(s.location.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(line.iter().map(|&(x, y)| Circle::new((x, y), 4, color.filled())))?;
    }
    Ok(())
}

fn points(series: &ChartSeries, positions: &HashMap<&str, f64>) -> Vec<(f64, f64)> {
    series
        .points
        .iter()
        .filter_map(|p| {
            let x = *positions.get(p.month.as_str())?;
            Some((x, p.billable.to_f64().unwrap_or(0.0)))
        })
        .collect()
}

/// Value axis range with some headroom, always containing zero
fn padded_range(low: f64, high: f64) -> (f64, f64) {
    let low = low.min(0.0);
    let high = high.max(0.0);
    let span = high - low;
    if span <= f64::EPSILON {
        return (0.0, 1.0);
    }
    let pad = span * 0.1;
    (if low < 0.0 { low - pad } else { 0.0 }, high + pad)
}

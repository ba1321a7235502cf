//! Chart series derived from an aggregation
//!
//! The SVG itself is drawn by the api crate; this module only decides what
//! goes on the chart.

use crate::aggregate::Aggregation;
use rust_decimal::Decimal;
use salesdash_config::ChartType;
use serde::Serialize;

pub const CHART_X_LABEL: &str = "Month";
pub const CHART_Y_LABEL: &str = "Billable Amount";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub month: String,
    pub billable: Decimal,
}

/// All points for one location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub location: String,
    /// Position of this location among the charted locations, used to pick
    /// its palette color
    pub color_index: usize,
    pub points: Vec<ChartPoint>,
}

/// Everything needed to draw the chart for one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub chart_type: ChartType,
    pub title: String,
    /// Month categories on the x axis, ascending
    pub months: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Lowest and highest plotted value, always including zero
    pub fn value_range(&self) -> (Decimal, Decimal) {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.billable))
            .fold((Decimal::ZERO, Decimal::ZERO), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }
}

pub fn chart_title(chart_type: ChartType) -> String {
    format!(
        "Billable Amounts for Selected Locations and Months ({})",
        chart_type.label()
    )
}

/// One series per location present in the aggregation. Rows are already
/// ordered by location then month, so points come out in month order.
pub fn build_series(aggregation: &Aggregation) -> Vec<ChartSeries> {
    let mut series: Vec<ChartSeries> = Vec::new();
    for row in aggregation.rows() {
        let point = ChartPoint {
            month: row.transaction_month.clone(),
            billable: row.billable(),
        };
        match series.last_mut() {
            Some(current) if current.location == row.transaction_location => current.points.push(point),
            _ => series.push(ChartSeries {
                location: row.transaction_location.clone(),
                color_index: series.len(),
                points: vec![point],
            }),
        }
    }
    series
}

pub fn build_chart(aggregation: &Aggregation, chart_type: ChartType) -> ChartData {
    ChartData {
        chart_type,
        title: chart_title(chart_type),
        months: aggregation.months().into_iter().map(str::to_string).collect(),
        series: build_series(aggregation),
    }
}

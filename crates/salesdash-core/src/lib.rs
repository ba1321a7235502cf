//! Dashboard logic: access gate, filtering, aggregation and the render model

pub mod access;
pub mod aggregate;
pub mod chart;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod selection;

use salesdash_parser::ParserRef;

pub use access::{AccessGate, AccessState};
pub use aggregate::{aggregate, aggregate_selection, filter_rows, AggregatedRow, Aggregation};
pub use chart::{build_chart, chart_title, ChartData, ChartPoint, ChartSeries, CHART_X_LABEL, CHART_Y_LABEL};
pub use dashboard::{build_loaded_view, render_dashboard, DashboardView, LoadedView, UnlockedContent, UploadState};
pub use dataset::{Dataset, FilterOptions};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use selection::{Selection, SelectionRequest};

/// Parse an uploaded file into a dataset.
///
/// The file must contain at least one data row; a header on its own is
/// reported as an empty upload.
pub async fn load_dataset(parser: &ParserRef, file_name: &str, content: &[u8]) -> CoreResult<Dataset> {
    let table = parser.parse(content).await?;
    if table.rows.is_empty() {
        return Err(CoreError::EmptyUpload);
    }
    log::info!(
        "Loaded {} rows with {} columns from {}",
        table.rows.len(),
        table.columns.len(),
        file_name
    );
    Ok(Dataset::new(file_name, table))
}

//! Render description for one dashboard request
//!
//! `render_dashboard` is the single entry point the web layer calls on every
//! interaction. It decides which parts of the page exist; the api crate only
//! turns the result into HTML.

use crate::access::AccessState;
use crate::aggregate::{aggregate_selection, AggregatedRow};
use crate::chart::{build_chart, ChartData};
use crate::dataset::{Dataset, FilterOptions};
use crate::error::{CoreError, ErrorDetails};
use crate::selection::{Selection, SelectionRequest};
use rust_decimal::Decimal;
use salesdash_config::ChartType;
use serde::Serialize;
use std::sync::Arc;

/// What the session currently holds for its upload control
#[derive(Debug, Clone, Default)]
pub enum UploadState {
    #[default]
    Empty,
    Failed {
        file_name: String,
        details: ErrorDetails,
    },
    Loaded(Arc<Dataset>),
}

impl UploadState {
    pub fn failed(file_name: impl Into<String>, error: &CoreError) -> Self {
        UploadState::Failed {
            file_name: file_name.into(),
            details: error.to_details(),
        }
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        match self {
            UploadState::Loaded(dataset) => Some(dataset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    /// Only the password field and the rejection message are shown
    Locked { message: String },
    Unlocked {
        message: String,
        content: UnlockedContent,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnlockedContent {
    AwaitingUpload,
    UploadFailed { file_name: String, error: ErrorDetails },
    Loaded(LoadedView),
}

/// Controls, metric, table and chart for a loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedView {
    pub source_name: String,
    pub row_count: usize,
    pub options: FilterOptions,
    pub selection: Selection,
    pub rows: Vec<AggregatedRow>,
    pub total_billable: Decimal,
    pub chart: ChartData,
}

pub fn build_loaded_view(dataset: &Dataset, selection: Selection) -> LoadedView {
    let aggregation = aggregate_selection(dataset, &selection);
    let chart = build_chart(&aggregation, selection.chart_type);
    LoadedView {
        source_name: dataset.source_name().to_string(),
        row_count: dataset.len(),
        options: dataset.filter_options(&selection.years),
        total_billable: aggregation.total_billable(),
        rows: aggregation.rows().to_vec(),
        chart,
        selection,
    }
}

pub fn render_dashboard(
    access: AccessState,
    upload: &UploadState,
    request: &SelectionRequest,
    default_chart: ChartType,
) -> DashboardView {
    if !access.is_unlocked() {
        return DashboardView::Locked {
            message: access.message().to_string(),
        };
    }

    let content = match upload {
        UploadState::Empty => UnlockedContent::AwaitingUpload,
        UploadState::Failed { file_name, details } => UnlockedContent::UploadFailed {
            file_name: file_name.clone(),
            error: details.clone(),
        },
        UploadState::Loaded(dataset) => {
            let selection = Selection::resolve_form(request, dataset, default_chart);
            UnlockedContent::Loaded(build_loaded_view(dataset, selection))
        }
    };

    DashboardView::Unlocked {
        message: access.message().to_string(),
        content,
    }
}

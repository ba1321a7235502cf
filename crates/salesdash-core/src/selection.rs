//! Per-request filter selection
//!
//! The selection is rebuilt from the request on every interaction. Nothing
//! here is persisted between requests.

use crate::dataset::Dataset;
use salesdash_config::ChartType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw filter parameters as submitted by the sidebar form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub years: Vec<String>,
    #[serde(default)]
    pub months: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    /// Chart type, either `line`/`bar` or the selector label
    #[serde(default)]
    pub chart: Option<String>,
    /// Years the month list was rendered for
    #[serde(default)]
    pub prev_years: Vec<String>,
    /// Set once the sidebar form has been submitted at least once
    #[serde(default)]
    pub submitted: bool,
}

/// Resolved selection, restricted to values that exist in the dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub years: BTreeSet<String>,
    pub months: BTreeSet<String>,
    pub locations: BTreeSet<String>,
    pub chart_type: ChartType,
}

impl Selection {
    pub fn new<Y, M, L>(years: Y, months: M, locations: L, chart_type: ChartType) -> Self
    where
        Y: IntoIterator,
        Y::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        Self {
            years: years.into_iter().map(Into::into).collect(),
            months: months.into_iter().map(Into::into).collect(),
            locations: locations.into_iter().map(Into::into).collect(),
            chart_type,
        }
    }

    /// Resolve a query against the loaded dataset.
    ///
    /// The submitted months are taken as given, restricted to the months of
    /// the selected years. Without any months every month of the selected
    /// years is used. A query carrying the sidebar's `submitted` marker follows
    /// the form rules of [`Selection::resolve_form`].
    pub fn resolve(request: &SelectionRequest, dataset: &Dataset, default_chart: ChartType) -> Self {
        Self::resolve_with(request, dataset, default_chart, |request, years, previous_years| {
            if request.submitted {
                previous_years != years
            } else {
                request.months.is_empty()
            }
        })
    }

    /// Resolve a sidebar form submission against the loaded dataset.
    ///
    /// Years and locations default to nothing selected. The month list is
    /// reset to every month of the selected years whenever the year selection
    /// differs from the one the month list was rendered for; otherwise the
    /// submitted months are kept as far as they are still offered.
    pub fn resolve_form(request: &SelectionRequest, dataset: &Dataset, default_chart: ChartType) -> Self {
        Self::resolve_with(request, dataset, default_chart, |request, years, previous_years| {
            !request.submitted || previous_years != years
        })
    }

    fn resolve_with<F>(request: &SelectionRequest, dataset: &Dataset, default_chart: ChartType, reset_months: F) -> Self
    where
        F: FnOnce(&SelectionRequest, &BTreeSet<String>, &BTreeSet<String>) -> bool,
    {
        let available_years: BTreeSet<String> = dataset.years().into_iter().collect();
        let available_locations: BTreeSet<String> = dataset.locations().into_iter().collect();

        let years = restrict(&request.years, &available_years);
        let previous_years = restrict(&request.prev_years, &available_years);
        let month_options: BTreeSet<String> = dataset.months_for_years(&years).into_iter().collect();

        let months = if reset_months(request, &years, &previous_years) {
            month_options
        } else {
            restrict(&request.months, &month_options)
        };

        let chart_type = request
            .chart
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(default_chart);

        Self {
            years,
            months,
            locations: restrict(&request.locations, &available_locations),
            chart_type,
        }
    }

    /// True when any of the three filters selects nothing
    pub fn is_empty(&self) -> bool {
        self.years.is_empty() || self.months.is_empty() || self.locations.is_empty()
    }
}

fn restrict(values: &[String], allowed: &BTreeSet<String>) -> BTreeSet<String> {
    values.iter().filter(|v| allowed.contains(*v)).cloned().collect()
}

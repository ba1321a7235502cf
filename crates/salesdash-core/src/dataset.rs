//! Loaded upload and the selectable filter values derived from it

use salesdash_parser::{ParsedTable, TransactionRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One uploaded file, immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    source_name: String,
    columns: Vec<String>,
    rows: Vec<TransactionRow>,
}

/// Options offered by the three multi-select lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub years: Vec<String>,
    /// Months of the currently selected years only
    pub months: Vec<String>,
    pub locations: Vec<String>,
}

impl Dataset {
    pub fn new(source_name: impl Into<String>, table: ParsedTable) -> Self {
        Self {
            source_name: source_name.into(),
            columns: table.columns,
            rows: table.rows,
        }
    }

    pub fn from_rows(source_name: impl Into<String>, rows: Vec<TransactionRow>) -> Self {
        let columns = salesdash_parser::REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        Self {
            source_name: source_name.into(),
            columns,
            rows,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TransactionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years, ascending
    pub fn years(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|r| r.transaction_year.as_str()))
    }

    /// Distinct months among rows whose year is selected, ascending
    pub fn months_for_years(&self, years: &BTreeSet<String>) -> Vec<String> {
        distinct(
            self.rows
                .iter()
                .filter(|r| years.contains(&r.transaction_year))
                .map(|r| r.transaction_month.as_str()),
        )
    }

    /// Distinct locations, ascending. Independent of any selection.
    pub fn locations(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|r| r.transaction_location.as_str()))
    }

    pub fn filter_options(&self, selected_years: &BTreeSet<String>) -> FilterOptions {
        FilterOptions {
            years: self.years(),
            months: self.months_for_years(selected_years),
            locations: self.locations(),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

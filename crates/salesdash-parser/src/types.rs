//! Row and table types produced by the loader

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const COL_DATE: &str = "transaction_date";
pub const COL_LOCATION: &str = "transaction_location";
pub const COL_DELIVERED: &str = "total_delivered";
pub const COL_RETURNED: &str = "total_returned";

/// Columns every upload must carry, in the order they are checked
pub const REQUIRED_COLUMNS: [&str; 4] = [COL_DATE, COL_LOCATION, COL_DELIVERED, COL_RETURNED];

/// One transaction line of an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub transaction_date: NaiveDate,
    pub transaction_location: String,
    pub total_delivered: Decimal,
    pub total_returned: Decimal,
    /// `YYYY-MM`, derived from `transaction_date`
    pub transaction_month: String,
    /// `YYYY`, derived from `transaction_date`
    pub transaction_year: String,
    /// Every other column of the upload, unused by the dashboard
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl TransactionRow {
    pub fn new(
        transaction_date: NaiveDate,
        transaction_location: impl Into<String>,
        total_delivered: Decimal,
        total_returned: Decimal,
    ) -> Self {
        Self {
            transaction_month: transaction_date.format("%Y-%m").to_string(),
            transaction_year: transaction_date.format("%Y").to_string(),
            transaction_date,
            transaction_location: transaction_location.into(),
            total_delivered,
            total_returned,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, extra: BTreeMap<String, String>) -> Self {
        self.extra = extra;
        self
    }
}

/// A parsed upload: header names in file order plus the rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<TransactionRow>,
}

//! Row filtering and (location, month) aggregation

use crate::dataset::Dataset;
use crate::selection::Selection;
use rust_decimal::Decimal;
use salesdash_parser::TransactionRow;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Sums for one (location, month) group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRow {
    pub transaction_location: String,
    pub transaction_month: String,
    pub total_delivered: Decimal,
    pub total_returned: Decimal,
}

impl AggregatedRow {
    /// Delivered minus returned. May be negative.
    pub fn billable(&self) -> Decimal {
        self.total_delivered - self.total_returned
    }
}

impl Serialize for AggregatedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AggregatedRow", 5)?;
        state.serialize_field("transaction_location", &self.transaction_location)?;
        state.serialize_field("transaction_month", &self.transaction_month)?;
        state.serialize_field("total_delivered", &self.total_delivered)?;
        state.serialize_field("total_returned", &self.total_returned)?;
        state.serialize_field("billable", &self.billable())?;
        state.end()
    }
}

/// Aggregated table sorted by location, then month
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    rows: Vec<AggregatedRow>,
}

impl Aggregation {
    pub fn rows(&self) -> &[AggregatedRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Headline metric: sum of billable over every aggregated row
    pub fn total_billable(&self) -> Decimal {
        self.rows.iter().map(AggregatedRow::billable).sum()
    }

    /// Locations present in the table, ascending
    pub fn locations(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.transaction_location.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Months present in the table, ascending
    pub fn months(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|r| r.transaction_month.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Rows whose year, month and location are all selected
pub fn filter_rows<'a>(dataset: &'a Dataset, selection: &Selection) -> Vec<&'a TransactionRow> {
    dataset
        .rows()
        .iter()
        .filter(|row| {
            selection.years.contains(&row.transaction_year)
                && selection.months.contains(&row.transaction_month)
                && selection.locations.contains(&row.transaction_location)
        })
        .collect()
}

/// Group rows by (location, month) and sum both amount columns.
/// Groups are only produced for combinations that occur in the input.
pub fn aggregate<'a>(rows: impl IntoIterator<Item = &'a TransactionRow>) -> Aggregation {
    let mut groups: BTreeMap<(&str, &str), (Decimal, Decimal)> = BTreeMap::new();
    for row in rows {
        let entry = groups
            .entry((row.transaction_location.as_str(), row.transaction_month.as_str()))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += row.total_delivered;
        entry.1 += row.total_returned;
    }

    let rows = groups
        .into_iter()
        .map(|((location, month), (delivered, returned))| AggregatedRow {
            transaction_location: location.to_string(),
            transaction_month: month.to_string(),
            total_delivered: delivered,
            total_returned: returned,
        })
        .collect();

    Aggregation { rows }
}

/// Filter then aggregate in one step
pub fn aggregate_selection(dataset: &Dataset, selection: &Selection) -> Aggregation {
    let rows = filter_rows(dataset, selection);
    log::debug!(
        "{} of {} rows match {} years, {} months, {} locations",
        rows.len(),
        dataset.len(),
        selection.years.len(),
        selection.months.len(),
        selection.locations.len()
    );
    aggregate(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use salesdash_config::ChartType;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn row(date: &str, location: &str, delivered: &str, returned: &str) -> TransactionRow {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        TransactionRow::new(date, location, dec(delivered), dec(returned))
    }

    fn dataset() -> Dataset {
        Dataset::from_rows(
            "sales.csv",
            vec![
                row("2024-01-15", "A", "100", "10"),
                row("2024-01-20", "A", "50", "0"),
                row("2024-02-01", "B", "200", "20"),
            ],
        )
    }

    fn select(years: &[&str], months: &[&str], locations: &[&str]) -> Selection {
        Selection::new(
            years.iter().copied(),
            months.iter().copied(),
            locations.iter().copied(),
            ChartType::Line,
        )
    }

    #[test]
    fn test_aggregate_groups_by_location_and_month() {
        let ds = dataset();
        let selection = select(&["2024"], &["2024-01", "2024-02"], &["A", "B"]);
        let agg = aggregate_selection(&ds, &selection);

        assert_eq!(agg.rows().len(), 2);
        let a = &agg.rows()[0];
        assert_eq!(a.transaction_location, "A");
        assert_eq!(a.transaction_month, "2024-01");
        assert_eq!(a.total_delivered, dec("150"));
        assert_eq!(a.total_returned, dec("10"));
        assert_eq!(a.billable(), dec("140"));

        let b = &agg.rows()[1];
        assert_eq!(b.transaction_location, "B");
        assert_eq!(b.transaction_month, "2024-02");
        assert_eq!(b.billable(), dec("180"));

        assert_eq!(agg.total_billable(), dec("320"));
    }

    #[test]
    fn test_filter_is_conjunction() {
        let ds = dataset();
        assert_eq!(filter_rows(&ds, &select(&["2024"], &["2024-01"], &["B"])).len(), 0);
        assert_eq!(filter_rows(&ds, &select(&["2024"], &["2024-01"], &["A"])).len(), 2);
        assert_eq!(filter_rows(&ds, &select(&["2023"], &["2024-01"], &["A"])).len(), 0);
    }

    #[test]
    fn test_total_equals_sum_over_matching_rows() {
        let ds = dataset();
        let selection = select(&["2024"], &["2024-01", "2024-02"], &["A", "B"]);
        let expected: Decimal = filter_rows(&ds, &selection)
            .iter()
            .map(|r| r.total_delivered - r.total_returned)
            .sum();
        assert_eq!(aggregate_selection(&ds, &selection).total_billable(), expected);
    }

    #[test]
    fn test_empty_selection_yields_zero() {
        let ds = dataset();
        for selection in [
            select(&[], &["2024-01"], &["A"]),
            select(&["2024"], &[], &["A"]),
            select(&["2024"], &["2024-01"], &[]),
        ] {
            let agg = aggregate_selection(&ds, &selection);
            assert!(agg.is_empty());
            assert_eq!(agg.total_billable(), Decimal::ZERO);
        }
    }

    #[test]
    fn test_disjoint_locations_are_additive() {
        let ds = dataset();
        let months = ["2024-01", "2024-02"];
        let both = aggregate_selection(&ds, &select(&["2024"], &months, &["A", "B"]));
        let a = aggregate_selection(&ds, &select(&["2024"], &months, &["A"]));
        let b = aggregate_selection(&ds, &select(&["2024"], &months, &["B"]));
        assert_eq!(both.total_billable(), a.total_billable() + b.total_billable());

        let mut union: Vec<AggregatedRow> = a.rows().iter().chain(b.rows()).cloned().collect();
        union.sort_by(|x, y| {
            (&x.transaction_location, &x.transaction_month).cmp(&(&y.transaction_location, &y.transaction_month))
        });
        assert_eq!(union, both.rows());
    }

    #[test]
    fn test_negative_billable_is_kept() {
        let rows = [row("2024-03-01", "C", "5", "12.5")];
        let agg = aggregate(rows.iter());
        assert_eq!(agg.rows()[0].billable(), dec("-7.5"));
        assert_eq!(agg.total_billable(), dec("-7.5"));
    }

    #[test]
    fn test_output_sorted_and_serialized_with_billable() {
        let rows = [
            row("2024-02-01", "B", "1", "0"),
            row("2024-01-01", "B", "1", "0"),
            row("2024-02-01", "A", "3", "1"),
        ];
        let agg = aggregate(rows.iter());
        let keys: Vec<_> = agg
            .rows()
            .iter()
            .map(|r| (r.transaction_location.as_str(), r.transaction_month.as_str()))
            .collect();
        assert_eq!(keys, vec![("A", "2024-02"), ("B", "2024-01"), ("B", "2024-02")]);
        assert_eq!(agg.locations(), vec!["A", "B"]);
        assert_eq!(agg.months(), vec!["2024-01", "2024-02"]);

        let json = serde_json::to_value(&agg.rows()[0]).unwrap();
        assert_eq!(json["billable"], "2");
    }
}

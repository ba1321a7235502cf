//! Delimited CSV reader for transaction uploads

use crate::error::ParseError;
use crate::types::{ParsedTable, TransactionRow, COL_DATE, COL_DELIVERED, COL_LOCATION, COL_RETURNED, REQUIRED_COLUMNS};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Date-time layouts whose date part is used when no plain date format matches
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Reader settings
#[derive(Debug, Clone)]
pub struct ParserOptions {
    pub delimiter: u8,
    pub date_formats: Vec<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiter: b'|',
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%Y/%m/%d".to_string(),
                "%m/%d/%Y".to_string(),
                "%d.%m.%Y".to_string(),
                "%Y%m%d".to_string(),
            ],
        }
    }
}

/// Column positions of the required fields within a header row
struct ColumnIndex {
    date: usize,
    location: usize,
    delivered: usize,
    returned: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, ParseError> {
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ParseError::MissingColumn { column: column.to_string() });
            }
        }
        let position = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
        Ok(Self {
            date: position(COL_DATE),
            location: position(COL_LOCATION),
            delivered: position(COL_DELIVERED),
            returned: position(COL_RETURNED),
        })
    }

    fn is_required(&self, index: usize) -> bool {
        index == self.date || index == self.location || index == self.delivered || index == self.returned
    }
}

/// Loader for `|`-delimited (by default) transaction files
#[derive(Debug, Clone, Default)]
pub struct PipeCsvParser {
    options: ParserOptions,
}

impl PipeCsvParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Parse an uploaded file into rows with derived month and year
    pub fn parse_bytes(&self, content: &[u8]) -> Result<ParsedTable, ParseError> {
        if content.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyInput);
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content);

        let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let index = ColumnIndex::resolve(&columns)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let field = |i: usize| record.get(i).unwrap_or_default();

            let raw_date = field(index.date);
            let date = parse_date(raw_date, &self.options.date_formats).ok_or_else(|| {
                ParseError::InvalidDate { line, value: raw_date.to_string() }
            })?;
            let delivered = parse_amount(field(index.delivered)).ok_or_else(|| ParseError::InvalidNumber {
                line,
                column: COL_DELIVERED.to_string(),
                value: field(index.delivered).to_string(),
            })?;
            let returned = parse_amount(field(index.returned)).ok_or_else(|| ParseError::InvalidNumber {
                line,
                column: COL_RETURNED.to_string(),
                value: field(index.returned).to_string(),
            })?;

            let extra: BTreeMap<String, String> = columns
                .iter()
                .enumerate()
                .filter(|(i, _)| !index.is_required(*i))
                .map(|(i, name)| (name.clone(), field(i).to_string()))
                .collect();

            rows.push(TransactionRow::new(date, field(index.location), delivered, returned).with_extra(extra));
        }

        Ok(ParsedTable { columns, rows })
    }
}

/// Parse a calendar date, trying the configured formats first and then
/// common date-time layouts (the time part is dropped)
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(date) = formats.iter().find_map(|f| NaiveDate::parse_from_str(value, f).ok()) {
        return Some(date);
    }
    if let Some(dt) = DATETIME_FORMATS.iter().find_map(|f| NaiveDateTime::parse_from_str(value, f).ok()) {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive())
}

/// Parse a numeric cell. Empty cells count as zero.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if value.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<ParsedTable, ParseError> {
        PipeCsvParser::default().parse_bytes(input.as_bytes())
    }

    #[test]
    fn test_parse_pipe_delimited() {
        let input = "transaction_date|transaction_location|total_delivered|total_returned|sku\n\
                     2024-01-15|A|100|10|X-1\n\
                     2024-02-01|B|200.5|20|X-2\n";
        let table = parse(input).unwrap();

        assert_eq!(table.columns.len(), 5);
        assert_eq!(table.rows.len(), 2);

        let first = &table.rows[0];
        assert_eq!(first.transaction_location, "A");
        assert_eq!(first.transaction_month, "2024-01");
        assert_eq!(first.transaction_year, "2024");
        assert_eq!(first.total_delivered, Decimal::from(100));
        assert_eq!(first.extra.get("sku").map(String::as_str), Some("X-1"));

        assert_eq!(table.rows[1].total_delivered, Decimal::from_str("200.5").unwrap());
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let input = "total_returned|transaction_location|transaction_date|total_delivered\n5|North|2023-12-31|50\n";
        let table = parse(input).unwrap();
        let row = &table.rows[0];
        assert_eq!(row.transaction_location, "North");
        assert_eq!(row.total_returned, Decimal::from(5));
        assert_eq!(row.transaction_month, "2023-12");
    }

    #[test]
    fn test_missing_date_column() {
        let input = "transaction_location|total_delivered|total_returned\nA|1|0\n";
        match parse(input) {
            Err(ParseError::MissingColumn { column }) => assert_eq!(column, "transaction_date"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_comma_file_reports_missing_column() {
        let input = "transaction_date,transaction_location,total_delivered,total_returned\n2024-01-15,A,1,0\n";
        assert!(matches!(parse(input), Err(ParseError::MissingColumn { .. })));
    }

    #[test]
    fn test_invalid_date() {
        let input = "transaction_date|transaction_location|total_delivered|total_returned\n\
                     2024-01-15|A|1|0\n\
                     someday|A|1|0\n";
        match parse(input) {
            Err(ParseError::InvalidDate { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "someday");
            }
            other => panic!("expected invalid date, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_number() {
        let input = "transaction_date|transaction_location|total_delivered|total_returned\n2024-01-15|A|lots|0\n";
        match parse(input) {
            Err(ParseError::InvalidNumber { column, value, .. }) => {
                assert_eq!(column, "total_delivered");
                assert_eq!(value, "lots");
            }
            other => panic!("expected invalid number, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_amount_is_zero() {
        let input = "transaction_date|transaction_location|total_delivered|total_returned\n2024-01-15|A|12|\n";
        let table = parse(input).unwrap();
        assert_eq!(table.rows[0].total_returned, Decimal::ZERO);
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let input = "transaction_date|transaction_location|total_delivered|total_returned\n2024-01-15|A|12\n";
        assert!(matches!(parse(input), Err(ParseError::Csv(_))));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse(""), Err(ParseError::EmptyInput)));
        assert!(matches!(parse("  \n"), Err(ParseError::EmptyInput)));
    }

    #[test]
    fn test_header_only_has_no_rows() {
        let table = parse("transaction_date|transaction_location|total_delivered|total_returned\n").unwrap();
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        let formats = ParserOptions::default().date_formats;
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_date("2024-03-07", &formats), Some(expected));
        assert_eq!(parse_date("2024/03/07", &formats), Some(expected));
        assert_eq!(parse_date("03/07/2024", &formats), Some(expected));
        assert_eq!(parse_date("07.03.2024", &formats), Some(expected));
        assert_eq!(parse_date("2024-03-07 13:45:00", &formats), Some(expected));
        assert_eq!(parse_date("2024-03-07T13:45:00+02:00", &formats), Some(expected));
        assert_eq!(parse_date("", &formats), None);
        assert_eq!(parse_date("2024-13-40", &formats), None);
    }

    #[test]
    fn test_custom_delimiter() {
        let parser = PipeCsvParser::new(ParserOptions { delimiter: b';', ..ParserOptions::default() });
        let input = "transaction_date;transaction_location;total_delivered;total_returned\n2024-01-15;A;1;0\n";
        assert_eq!(parser.parse_bytes(input.as_bytes()).unwrap().rows.len(), 1);
    }
}

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};

use crate::{Cell, Column, Field, Table, Values};

/// Date formats understood by the cleaner, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Date-time formats understood by the cleaner, the time is discarded
///
/// `%.f` also matches a missing fraction.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// The table lacks at least one of the required columns
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing columns in CSV: {}", .missing.join(", "))]
pub struct SchemaError {
    /// The names of the missing columns, sorted
    pub missing: Vec<String>,
}

/// A cleaned transaction table
///
/// Guarantees that all [`Field`]s are present, that the amount column holds
/// floats and the date column holds dates, and that neither of them contains
/// null values. Additional columns are kept as they were loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionTable(Table);

impl TransactionTable {
    /// The number of transactions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying table
    pub fn table(&self) -> &Table {
        &self.0
    }

    #[cfg(test)]
    pub fn into_table(self) -> Table {
        self.0
    }

    /// The amounts of all transactions, in row order
    pub fn amounts(&self) -> impl Iterator<Item = f64> + '_ {
        let values = self.values(Field::Amount);
        (0..self.len()).filter_map(move |row| match values.cell(row) {
            Cell::Float(amount) => Some(amount),
            _ => None,
        })
    }

    /// The dates of all transactions, in row order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let values = self.values(Field::Date);
        (0..self.len()).filter_map(move |row| match values.cell(row) {
            Cell::Date(date) => Some(date),
            _ => None,
        })
    }

    /// The categories of all transactions, in row order
    pub fn categories(&self) -> impl Iterator<Item = Option<Cow<'_, str>>> + '_ {
        let values = self.values(Field::Category);
        (0..self.len()).map(move |row| values.cell(row).to_text())
    }

    fn values(&self, field: Field) -> &Values {
        // every field is present, see `clean`
        self.0
            .column(field.header())
            .map(Column::values)
            .unwrap_or(&EMPTY)
    }
}

static EMPTY: Values = Values::Text(Vec::new());

/// Validates and coerces a freshly loaded table
///
/// 1. Rows that are null in every column are dropped.
/// 2. All [`Field`]s have to be present, otherwise a [`SchemaError`] names
///    the missing ones.
/// 3. Amounts are parsed as floats and dates as calendar dates. Values that
///    cannot be parsed become null.
/// 4. Rows with a null amount or date are dropped.
///
/// The order of the remaining rows is kept.
pub fn clean(mut table: Table) -> Result<TransactionTable, SchemaError> {
    let rows = table.len();
    table.drop_empty_rows();
    debug!("Dropped {} empty rows", rows - table.len());

    let mut missing: Vec<String> = Field::ALL
        .iter()
        .map(|field| field.header())
        .filter(|header| table.column(header).is_none())
        .map(str::to_owned)
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(SchemaError { missing });
    }

    if let Some(column) = table.column_mut(Field::Amount.header()) {
        column.convert(|values| Values::Float(coerce(values, parse_amount)));
    }
    if let Some(column) = table.column_mut(Field::Date.header()) {
        column.convert(|values| Values::Date(coerce(values, parse_date)));
    }

    let keep: Vec<bool> = {
        let amounts = table.column(Field::Amount.header()).map(Column::values);
        let dates = table.column(Field::Date.header()).map(Column::values);
        (0..table.len())
            .map(|row| {
                let present = |values: Option<&Values>| values.map_or(false, |v| !v.is_null(row));
                present(amounts) && present(dates)
            })
            .collect()
    };

    let rows = table.len();
    table.retain_rows(&keep);
    info!("Cleaned {} transactions, dropped {} unusable rows", table.len(), rows - table.len());

    Ok(TransactionTable(table))
}

/// Converts every cell of `values` with `parse`, values of the target type
/// are passed through by their textual form
fn coerce<T>(values: Values, parse: fn(&str) -> Option<T>) -> Vec<Option<T>> {
    match values {
        Values::Text(values) => values
            .into_iter()
            .map(|value| value.as_deref().and_then(parse))
            .collect(),
        other => (0..other.len())
            .map(|row| other.cell(row).to_text().as_deref().and_then(parse))
            .collect(),
    }
}

/// Parses an amount, `NaN` counts as unparseable
pub fn parse_amount(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| !amount.is_nan())
}

/// Parses a calendar date in one of the supported formats
///
/// Timestamps with a `Z` or an offset keep the date as written, they are not
/// converted to UTC.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|date_time| date_time.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|date_time| date_time.date_naive())
        })
}

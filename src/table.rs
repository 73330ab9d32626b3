use std::borrow::Cow;
use std::collections::HashSet;
use std::io;

use chrono::NaiveDate;

/// Cell contents that are read as missing values
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// The format dates are written in
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Possible errors to occur while building or reading a table
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("Line {line} has {found} fields, but the header only names {expected}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// The typed values of one column
///
/// Every cell is nullable. Freshly read columns are always [`Values::Text`],
/// other variants only appear after a column has been coerced.
#[derive(Clone, Debug, PartialEq)]
pub enum Values {
    Text(Vec<Option<String>>),
    Float(Vec<Option<f64>>),
    Date(Vec<Option<NaiveDate>>),
}

impl Values {
    /// The number of cells
    pub(crate) fn len(&self) -> usize {
        match self {
            Values::Text(values) => values.len(),
            Values::Float(values) => values.len(),
            Values::Date(values) => values.len(),
        }
    }

    /// Whether the cell in `row` is null
    ///
    /// Rows out of bounds are reported as null.
    pub fn is_null(&self, row: usize) -> bool {
        matches!(self.cell(row), Cell::Null)
    }

    /// The cell in `row`
    pub fn cell(&self, row: usize) -> Cell<'_> {
        let cell = match self {
            Values::Text(values) => values.get(row).and_then(|v| v.as_deref().map(Cell::Text)),
            Values::Float(values) => values.get(row).copied().flatten().map(Cell::Float),
            Values::Date(values) => values.get(row).copied().flatten().map(Cell::Date),
        };
        cell.unwrap_or(Cell::Null)
    }

    fn retain(&mut self, keep: &[bool]) {
        fn retain<T>(values: &mut Vec<T>, keep: &[bool]) {
            let mut row = 0;
            values.retain(|_| {
                let kept = keep.get(row).copied().unwrap_or(false);
                row += 1;
                kept
            });
        }

        match self {
            Values::Text(values) => retain(values, keep),
            Values::Float(values) => retain(values, keep),
            Values::Date(values) => retain(values, keep),
        }
    }
}

/// A borrowed view onto a single cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell<'a> {
    Null,
    Text(&'a str),
    Float(f64),
    Date(NaiveDate),
}

impl<'a> Cell<'a> {
    /// The textual representation of the cell, as it is written to CSV
    pub fn to_text(self) -> Option<Cow<'a, str>> {
        match self {
            Cell::Null => None,
            Cell::Text(text) => Some(Cow::Borrowed(text)),
            Cell::Float(value) => Some(Cow::Owned(format_float(value))),
            Cell::Date(date) => Some(Cow::Owned(date.format(DATE_FORMAT).to_string())),
        }
    }
}

impl serde::Serialize for Cell<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        match self.to_text() {
            Some(text) => serializer.serialize_str(&text),
            None => serializer.serialize_none(),
        }
    }
}

/// Formats a float in its shortest round-trip form, keeping a fractional part
/// for whole numbers (`100.0`, `-32.5`)
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

/// A named column
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    values: Values,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Values) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a text column from string literals, mapping `None` to null
    #[cfg(test)]
    pub(crate) fn text<'a>(name: impl Into<String>, values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let values = values.into_iter().map(|v| v.map(str::to_owned)).collect();
        Self::new(name, Values::Text(values))
    }

    /// The header name of the column
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Values {
        &mut self.values
    }

    /// Replaces the values by the result of `convert`
    ///
    /// The conversion has to keep the number of cells.
    pub fn convert(&mut self, convert: impl FnOnce(Values) -> Values) {
        let values = std::mem::replace(&mut self.values, Values::Text(Vec::new()));
        self.values = convert(values);
    }
}

/// A column-oriented table
///
/// All columns hold the same number of cells. Row operations keep the order
/// of the remaining rows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Creates a table from columns of equal length
    #[cfg(test)]
    pub(crate) fn from_columns(columns: Vec<Column>) -> Self {
        let rows = columns.first().map_or(0, |column| column.values.len());
        assert!(columns.iter().all(|column| column.values.len() == rows));

        Self { columns, rows }
    }

    /// Reads a table from delimited text with a header row
    ///
    /// Blank lines are skipped, missing values are read as null and rows that
    /// are shorter than the header are padded with nulls.
    pub fn from_reader<R: io::Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let names = unique_names(reader.headers()?.iter());
        let mut values = vec![Vec::new(); names.len()];
        let mut rows = 0;

        for record in reader.records() {
            let record = record?;
            if record.len() > names.len() {
                return Err(TableError::TooManyFields {
                    line: record.position().map_or(0, |position| position.line()),
                    expected: names.len(),
                    found: record.len(),
                });
            }

            for (index, column) in values.iter_mut().enumerate() {
                let cell = record
                    .get(index)
                    .filter(|cell| !MISSING_MARKERS.contains(cell))
                    .map(str::to_owned);
                column.push(cell);
            }
            rows += 1;
        }

        let columns = names
            .into_iter()
            .zip(values)
            .map(|(name, values)| Column::new(name, Values::Text(values)))
            .collect();

        Ok(Self { columns, rows })
    }

    /// Writes the table as comma separated text with a header row
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(self.columns.iter().map(Column::name))?;
        for row in 0..self.rows {
            let cells: Vec<_> = self.columns.iter().map(|column| column.values.cell(row)).collect();
            writer.serialize(cells)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// The column with the given header name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    /// Keeps only the rows whose entry in `keep` is `true`
    ///
    /// Rows beyond the end of `keep` are removed.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            column.values.retain(keep);
        }
        self.rows = keep.iter().take(self.rows).filter(|&&kept| kept).count();
    }

    /// Removes all rows that are null in every column
    pub fn drop_empty_rows(&mut self) {
        let keep: Vec<bool> = (0..self.rows)
            .map(|row| self.columns.iter().any(|column| !column.values.is_null(row)))
            .collect();
        self.retain_rows(&keep);
    }
}

/// Makes header names unique by suffixing repeated names with `.1`, `.2`, ...
fn unique_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for name in names {
        let mut candidate = name.to_owned();
        let mut suffix = 0;
        while !seen.insert(candidate.clone()) {
            suffix += 1;
            candidate = format!("{}.{}", name, suffix);
        }
        unique.push(candidate);
    }

    unique
}

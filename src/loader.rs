use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{Field, Table, TableError, Values};

/// Possible errors to occur while loading a transaction file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Could not open `{}`", .path.display())]
    Open {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Could not read the transaction file")]
    Table(#[from] TableError),
}

/// Options controlling how a transaction file is read
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Amounts use a comma as decimal separator, e.g. `-32,50`
    pub decimal_comma: bool,
    /// The field delimiter of the file
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            decimal_comma: false,
            delimiter: b',',
        }
    }
}

/// Loads the transaction file at `path`
///
/// A file that does not exist is not an error, but yields `Ok(None)`. Callers
/// should treat this as nothing to process.
pub fn load(path: &Path, options: &LoadOptions) -> Result<Option<Table>, LoadError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!("Transaction file `{}` not found", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(LoadError::Open {
                path: path.to_owned(),
                source,
            })
        }
    };

    let table = read(BufReader::new(file), options)?;
    info!(
        "Loaded {} rows with {} columns from `{}`",
        table.len(),
        table.columns().len(),
        path.display(),
    );

    Ok(Some(table))
}

/// Reads transactions from any delimited text source
pub fn read<R: io::Read>(reader: R, options: &LoadOptions) -> Result<Table, LoadError> {
    let mut table = Table::from_reader(reader, options.delimiter)?;
    if options.decimal_comma {
        rewrite_decimal_comma(&mut table);
    }

    Ok(table)
}

/// Replaces every `,` by a `.` in the amount column
///
/// This is a plain text substitution, the cells stay text until they are
/// coerced by the cleaner. Tables without an amount column are left alone.
pub fn rewrite_decimal_comma(table: &mut Table) {
    let column = match table.column_mut(Field::Amount.header()) {
        Some(column) => column,
        None => {
            debug!("No `{}` column, skipping decimal comma rewrite", Field::Amount);
            return;
        }
    };

    if let Values::Text(values) = column.values_mut() {
        for value in values.iter_mut().flatten() {
            if value.contains(',') {
                *value = value.replace(',', ".");
            }
        }
    }
}

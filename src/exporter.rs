use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use log::info;

use crate::TransactionTable;

/// Possible errors to occur while exporting a cleaned table
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Could not create the directory `{}`", .path.display())]
    CreateDir {
        path: PathBuf,
        source: io::Error,
    },
    #[error("Could not write `{}`", .path.display())]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Writes the cleaned table as CSV to `path` and returns the absolute path
/// of the written file
///
/// Missing parent directories are created. An existing file is overwritten.
pub fn export(table: &TransactionTable, path: &Path) -> Result<PathBuf, ExportError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ExportError::CreateDir {
            path: parent.to_owned(),
            source,
        })?;
    }

    let write_error = |source: io::Error| ExportError::Write {
        path: path.to_owned(),
        source,
    };
    let file = File::create(path).map_err(write_error)?;
    table.table().write_csv(BufWriter::new(file))?;

    let resolved = fs::canonicalize(path).map_err(write_error)?;
    info!("Exported {} transactions to `{}`", table.len(), resolved.display());

    Ok(resolved)
}

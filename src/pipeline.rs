use std::path::{Path, PathBuf};

use crate::{analyze, clean, export, load, ExportError, LoadError, LoadOptions, Metrics, SchemaError};

/// Possible errors to occur while processing a transaction file
///
/// Any of them stops the run before anything is exported.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// The outcome of a successful run
#[derive(Debug)]
pub struct Summary {
    pub metrics: Metrics,
    /// The absolute path of the exported file, if an export was requested
    pub exported: Option<PathBuf>,
}

/// Loads, cleans and analyzes the transaction file at `file` and exports the
/// cleaned rows to `out`, if given
///
/// Returns `Ok(None)` if `file` does not exist. Nothing is written unless
/// loading and cleaning succeeded.
pub fn process(file: &Path, out: Option<&Path>, options: &LoadOptions) -> Result<Option<Summary>, PipelineError> {
    let table = match load(file, options)? {
        Some(table) => table,
        None => return Ok(None),
    };

    let table = clean(table)?;
    let metrics = analyze(&table);
    let exported = out.map(|out| export(&table, out)).transpose()?;

    Ok(Some(Summary { metrics, exported }))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const TRANSACTIONS: &str = "Datum,Empfänger,Betrag,Kategorie
2024-01-01,Vermieter,\"-950,00\",Miete
2024-01-02,Supermarkt,\"-32,50\",Lebensmittel
kaputt,Kiosk,\"-3,00\",Freizeit
2024-01-05,Arbeitgeber,\"2800,00\",Gehalt
";

    fn decimal_comma() -> LoadOptions {
        LoadOptions {
            decimal_comma: true,
            ..LoadOptions::default()
        }
    }

    #[test]
    fn missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results").join("cleaned.csv");

        let summary = process(&dir.path().join("missing.csv"), Some(&out), &decimal_comma()).unwrap();

        assert!(summary.is_none());
        assert!(!out.exists());
        assert!(!dir.path().join("results").exists());
    }

    #[test]
    fn missing_column_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("transactions.csv");
        let out = dir.path().join("results").join("cleaned.csv");
        fs::write(&file, "Datum,Empfänger,Betrag\n2024-01-01,A,-1\n").unwrap();

        let error = process(&file, Some(&out), &LoadOptions::default()).unwrap_err();

        assert!(matches!(&error, PipelineError::Schema(SchemaError { missing }) if missing == &["Kategorie"]));
        assert!(!out.exists());
        assert!(!dir.path().join("results").exists());
    }

    #[test]
    fn malformed_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("transactions.csv");
        let out = dir.path().join("cleaned.csv");
        fs::write(&file, "Datum,Empfänger,Betrag,Kategorie\n2024-01-01,A,-1,Food,extra\n").unwrap();

        let error = process(&file, Some(&out), &LoadOptions::default()).unwrap_err();

        assert!(matches!(error, PipelineError::Load(_)));
        assert!(!out.exists());
    }

    #[test]
    fn exports_cleaned_rows() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("transactions.csv");
        let out = dir.path().join("results").join("cleaned.csv");
        fs::write(&file, TRANSACTIONS).unwrap();

        let summary = process(&file, Some(&out), &decimal_comma()).unwrap().unwrap();

        assert_eq!(summary.exported, Some(fs::canonicalize(&out).unwrap()));
        assert!((summary.metrics.total - 1817.5).abs() < 1e-9);
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "Datum,Empfänger,Betrag,Kategorie
2024-01-01,Vermieter,-950.0,Miete
2024-01-02,Supermarkt,-32.5,Lebensmittel
2024-01-05,Arbeitgeber,2800.0,Gehalt
",
        );
    }

    #[test]
    fn export_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("transactions.csv");
        fs::write(&file, TRANSACTIONS).unwrap();

        let summary = process(&file, None, &decimal_comma()).unwrap().unwrap();

        assert_eq!(summary.exported, None);
        assert_eq!(summary.metrics.top_count.len(), 3);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::debug;

use finance_cleaner::{process, LoadOptions};

/// Reads a transaction CSV, cleans it and prints summary metrics
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the transaction CSV file
    #[clap(long, default_value = "data/transactions.csv")]
    file: PathBuf,
    /// Export the cleaned transactions to this path, e.g. results/cleaned.csv
    #[clap(long)]
    out: Option<PathBuf>,
    /// Amounts use a comma as decimal separator, e.g. -32,50
    #[clap(long)]
    decimal_comma: bool,
    /// The field delimiter of the input file
    #[clap(long, default_value_t = ',')]
    delimiter: char,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    debug!("Parsed arguments: {:?}", args);

    // failures are reported, the exit code stays zero
    if let Err(e) = run(&args) {
        eprintln!("Fehler bei der Verarbeitung: {:#}", e);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let delimiter = u8::try_from(args.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("The delimiter {:?} is not a single ASCII character", args.delimiter))?;
    let options = LoadOptions {
        decimal_comma: args.decimal_comma,
        delimiter,
    };

    let summary = match process(&args.file, args.out.as_deref(), &options)? {
        Some(summary) => summary,
        None => {
            eprintln!("Datei nicht gefunden: {}. Bitte Pfad prüfen.", args.file.display());
            return Ok(());
        }
    };

    print!("{}", summary.metrics);
    if let Some(path) = summary.exported {
        println!("Bereinigte Daten exportiert nach: {}", path.display());
    }

    Ok(())
}

//! Cleans and summarises personal-finance transaction exports.
//!
//! The pipeline is strictly linear: [`load`] a delimited file into a
//! [`Table`], [`clean`] it into a [`TransactionTable`], [`analyze`] it into
//! [`Metrics`] and optionally [`export`] the cleaned rows again. [`process`]
//! runs all steps at once.

pub use self::{
    analyzer::{analyze, CategoryCount, CategorySum, Metrics, TOP_N},
    cleaner::{clean, parse_amount, parse_date, SchemaError, TransactionTable},
    exporter::{export, ExportError},
    loader::{load, rewrite_decimal_comma, LoadError, LoadOptions},
    pipeline::{process, PipelineError, Summary},
    table::{Cell, Column, Table, TableError, Values, DATE_FORMAT},
    transaction::Field,
};

mod analyzer;
mod cleaner;
mod exporter;
mod loader;
mod pipeline;
mod table;
mod transaction;

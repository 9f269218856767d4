//! Error types for feuille

use chrono::NaiveDate;
use feuille_formula::FormulaError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing or calculating a sheet
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed cell address
    #[error(transparent)]
    Address(#[from] feuille_core::Error),

    /// Formula parse, evaluation or rewrite error
    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// Address outside the sheet dimensions
    #[error("Cell {reference} is outside the {rows}x{cols} sheet")]
    OutOfBounds {
        reference: String,
        rows: u32,
        cols: u32,
    },

    /// Date moved past the supported calendar
    #[error("Date {date} moved by {days} days is out of range")]
    DateOutOfRange { date: NaiveDate, days: i64 },
}

impl From<Error> for FormulaError {
    fn from(err: Error) -> Self {
        match err {
            Error::Formula(e) => e,
            other => FormulaError::InvalidReference(other.to_string()),
        }
    }
}

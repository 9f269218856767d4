//! # feuille
//!
//! A small spreadsheet formula engine.
//!
//! feuille parses formulas such as `=A1*2 + $B$1 & " €"`, evaluates them
//! against a grid of cells with lazily memoized results, and rewrites their
//! references when a formula is copied to another cell.
//!
//! ## Features
//!
//! - Tokenizer and operator-precedence parser
//! - Loose value coercions (text to number, dates as serial numbers)
//! - Relative and anchored (`$`) references
//! - An in-memory [`Sheet`] with typed input, copy, fill and recalculation
//!
//! ## Example
//!
//! ```rust
//! use feuille::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! sheet.set_input("A1", "12,5").unwrap();
//! sheet.set_input("B1", "=A1*2").unwrap();
//! sheet.copy_cell("B1", "B2").unwrap();
//!
//! sheet.recalculate();
//! assert_eq!(sheet.text("B1").unwrap(), "25");
//! assert_eq!(sheet.text("B2").unwrap(), "0");
//! ```

pub mod calculation;
pub mod error;
pub mod input;
pub mod prelude;
pub mod sheet;

pub use calculation::CalculationStats;
pub use error::{Error, Result};
pub use input::parse_input;
pub use sheet::{CellContent, FillDirection, Sheet, SheetSettings};

// Re-export core types
pub use feuille_core::{display_text, to_number, Anchors, CellPos, Value};

// Re-export formula types
pub use feuille_formula::{
    evaluate, parse_formula, Formula, FormulaError, FormulaExpr, FormulaResult, Grid, Operator,
    ParseOptions, Precedence,
};

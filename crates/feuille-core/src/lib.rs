//! # feuille-core
//!
//! Core data structures for the feuille formula engine.
//!
//! This crate provides the fundamental types shared by the tokenizer, the
//! evaluator and the grid:
//! - [`Value`] - Computed values (numbers, text, booleans, dates)
//! - Coercion rules ([`to_number`], [`display_text`]) and serial dates
//! - [`CellPos`] and [`Anchors`] - A1-style cell addressing
//!
//! ## Example
//!
//! ```rust
//! use feuille_core::{display_text, to_number, CellPos, Value};
//!
//! let pos = CellPos::parse("$B$3").unwrap();
//! assert_eq!((pos.row, pos.col), (3, 2));
//!
//! assert_eq!(to_number(Some(&Value::text("12"))), 12.0);
//! assert_eq!(display_text(Some(&Value::Number(1.5))), "1,5");
//! ```

pub mod address;
pub mod error;
pub mod value;

// Re-exports for convenience
pub use address::{column_to_letters, letters_to_column, Anchors, CellPos};
pub use error::{Error, Result};
pub use value::{
    date_to_serial, display_text, round_significant, serial_to_date, strict_cmp, strict_eq,
    to_number, Value, DATE_EPOCH,
};

/// Number of significant digits kept by the default text format
pub const DISPLAY_PRECISION: usize = 7;

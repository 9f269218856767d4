//! # feuille-formula
//!
//! Formula language for feuille.
//!
//! This crate provides:
//! - Tokenizing (text → spans)
//! - Parsing (spans → expression tree)
//! - Evaluation against a [`Grid`] (expression tree → value), memoized per formula
//! - Reference rewriting when a formula is copied to another cell
//!
//! ## Example
//!
//! ```rust,ignore
//! use feuille_formula::Formula;
//!
//! let formula = Formula::parse("=A1*2+$B$1")?;
//! let value = formula.exec(&grid)?;
//! let copied = formula.relative_to(&grid, 1, 0)?; // "=A2*2+$B$1"
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod lexer;
pub mod parser;
pub mod rewrite;

pub use ast::{Fixity, FormulaExpr, Operator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, Grid};
pub use formula::Formula;
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{build, parse_formula, ParseOptions, Precedence};

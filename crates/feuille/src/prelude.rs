//! Prelude module - common imports for feuille users
//!
//! ```rust
//! use feuille::prelude::*;
//! ```

pub use crate::{
    CalculationStats,
    CellContent,
    CellPos,
    // Error types
    Error,
    FillDirection,
    Formula,
    FormulaError,
    // Grid capability
    Grid,
    ParseOptions,
    Precedence,
    Result,
    // Main types
    Sheet,
    SheetSettings,
    Value,
};

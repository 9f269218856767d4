//! Sheet recalculation
//!
//! Formula results are memoized per formula and never invalidated by edits.
//! Recalculation drops every cached result and evaluates each formula once.
//! Formulas referencing other formulas pull them in on demand, so the order
//! of the pass only affects which cell reports a shared error first.
//!
//! # Example
//!
//! ```rust
//! use feuille::Sheet;
//!
//! let mut sheet = Sheet::new();
//! sheet.set_input("A1", "10").unwrap();
//! sheet.set_input("A2", "20").unwrap();
//! sheet.set_input("A3", "=A1+A2").unwrap();
//!
//! let stats = sheet.recalculate();
//! assert_eq!(stats.cells_calculated, 1);
//! assert_eq!(sheet.text("A3").unwrap(), "30");
//! ```

use crate::sheet::Sheet;
use feuille_core::CellPos;
use feuille_formula::FormulaError;

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of formulas evaluated successfully
    pub cells_calculated: usize,
    /// Number of errors encountered during calculation
    pub errors: usize,
    /// Failing cells with their error, in row-major order
    pub failures: Vec<(CellPos, FormulaError)>,
}

impl CalculationStats {
    /// Check if every formula evaluated
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

impl Sheet {
    /// Drop every cached formula result
    pub fn reset_caches(&self) {
        for (_, formula) in self.formulas() {
            formula.reset_cache();
        }
    }

    /// Recalculate every formula in the sheet
    ///
    /// Errors do not stop the pass: they are logged, counted and reported in
    /// the returned stats, and the failing cell keeps no cached value.
    pub fn recalculate(&self) -> CalculationStats {
        self.reset_caches();

        let mut positions: Vec<CellPos> = self.formulas().map(|(pos, _)| pos).collect();
        positions.sort_unstable();

        let mut stats = CalculationStats {
            formula_count: positions.len(),
            ..Default::default()
        };

        for pos in positions {
            let Some(formula) = self.content_at(pos).and_then(|c| c.as_formula()) else {
                continue;
            };
            match formula.exec(self) {
                Ok(_) => stats.cells_calculated += 1,
                Err(e) => {
                    log::warn!("error calculating {}: {}", pos, e);
                    stats.errors += 1;
                    stats.failures.push((pos, e));
                }
            }
        }

        log::debug!(
            "recalculated {} formulas, {} errors",
            stats.formula_count,
            stats.errors
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use crate::sheet::Sheet;
    use feuille_core::{CellPos, Value};
    use feuille_formula::FormulaError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_recalculate_counts() {
        let mut sheet = Sheet::new();
        sheet.set_value("A1", 1.0).unwrap();
        sheet.set_formula("A2", "=A1+1").unwrap();
        sheet.set_formula("A3", "=A2+1").unwrap();

        let stats = sheet.recalculate();
        assert_eq!(stats.formula_count, 2);
        assert_eq!(stats.cells_calculated, 2);
        assert!(stats.is_clean());
        assert_eq!(sheet.text("A3").unwrap(), "3");
    }

    #[test]
    fn test_recalculate_picks_up_edits() {
        let mut sheet = Sheet::new();
        sheet.set_value("A1", 1.0).unwrap();
        sheet.set_formula("B1", "=A1*10").unwrap();
        assert_eq!(sheet.value("B1").unwrap(), Some(Value::Number(10.0)));

        sheet.set_value("A1", 2.0).unwrap();
        // still memoized
        assert_eq!(sheet.value("B1").unwrap(), Some(Value::Number(10.0)));

        sheet.recalculate();
        assert_eq!(sheet.value("B1").unwrap(), Some(Value::Number(20.0)));
    }

    #[test]
    fn test_recalculate_reports_errors() {
        let mut sheet = Sheet::new();
        sheet.set_formula("B2", "=SUM(A1)").unwrap();
        sheet.set_formula("A1", "=1+1").unwrap();

        let stats = sheet.recalculate();
        assert_eq!(stats.formula_count, 2);
        assert_eq!(stats.cells_calculated, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(
            stats.failures,
            vec![(
                CellPos::new(2, 2),
                FormulaError::UnsupportedFunctionCall("SUM".into())
            )]
        );
        assert_eq!(sheet.text("B2").unwrap(), "");
    }
}

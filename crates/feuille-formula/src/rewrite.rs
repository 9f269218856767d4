//! Reference rewriting for copied formulas
//!
//! When a formula is copied to another cell, its relative references move by
//! the same offset while anchored (`$`) components stay put.

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::Grid;
use crate::lexer::Token;
use feuille_core::Anchors;

/// Rewrite one reference for a copy offset by `drow` rows and `dcol` columns
///
/// The anchor position comes from the grid, so any reference text the grid
/// understands can be shifted. Anchoring markers are kept in the output.
pub fn shift_reference<G: Grid + ?Sized>(
    reference: &str,
    grid: &G,
    drow: i64,
    dcol: i64,
) -> FormulaResult<String> {
    let pos = grid.resolve_position(reference)?;
    let anchors = Anchors::of(reference);

    let drow = if anchors.row { 0 } else { drow };
    let dcol = if anchors.col { 0 } else { dcol };

    let shifted = pos.offset(drow, dcol).ok_or_else(|| {
        FormulaError::InvalidReference(format!(
            "{} moved by ({:+}, {:+}) leaves the grid",
            reference, drow, dcol
        ))
    })?;

    Ok(shifted.to_a1_anchored(anchors))
}

/// Splice shifted references into the formula source
///
/// Text outside the reference tokens is copied verbatim. `references` must be
/// the reference tokens of `source`, in source order.
pub fn shift_references<G: Grid + ?Sized>(
    source: &str,
    references: &[Token],
    grid: &G,
    drow: i64,
    dcol: i64,
) -> FormulaResult<String> {
    let mut result = String::with_capacity(source.len());
    let mut offset = 0;

    for token in references {
        result.push_str(&source[offset..token.start]);
        result.push_str(&shift_reference(&token.text, grid, drow, dcol)?);
        offset = token.end;
    }
    result.push_str(&source[offset..]);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;
    use feuille_core::{CellPos, Value};
    use pretty_assertions::assert_eq;

    /// Grid that only knows positions
    struct PositionGrid;

    impl Grid for PositionGrid {
        fn resolve_value(&self, _reference: &str) -> FormulaResult<Option<Value>> {
            Ok(None)
        }

        fn resolve_position(&self, reference: &str) -> FormulaResult<CellPos> {
            Ok(CellPos::parse(reference)?)
        }
    }

    fn shifted(source: &str, drow: i64, dcol: i64) -> String {
        Formula::parse(source)
            .unwrap()
            .relative_to(&PositionGrid, drow, dcol)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_shift_relative_reference() {
        assert_eq!(shifted("=A1", 1, 0), "=A2");
        assert_eq!(shifted("=A1", 0, 1), "=B1");
        assert_eq!(shifted("=C5", -2, -1), "=B3");
    }

    #[test]
    fn test_shift_anchored_reference() {
        assert_eq!(shifted("=$A$1", 1, 0), "=$A$1");
        assert_eq!(shifted("=$A$1", 3, 3), "=$A$1");
        assert_eq!(shifted("=$A1", 1, 1), "=$A2");
        assert_eq!(shifted("=A$1", 1, 1), "=B$1");
    }

    #[test]
    fn test_shift_keeps_surrounding_text() {
        assert_eq!(
            shifted("= A1 + \"A1\" *  $B$2-C3", 2, 0),
            "= A3 + \"A1\" *  $B$2-C5"
        );
    }

    #[test]
    fn test_shift_multi_letter_columns() {
        assert_eq!(shifted("=Z1", 0, 1), "=AA1");
        assert_eq!(shifted("=AB10", 0, -2), "=Z10");
    }

    #[test]
    fn test_shift_references_inside_call() {
        assert_eq!(shifted("=SUM(A1)", 1, 0), "=SUM(A2)");
    }

    #[test]
    fn test_shift_off_grid() {
        let formula = Formula::parse("=A1").unwrap();
        assert!(matches!(
            formula.relative_to(&PositionGrid, -1, 0),
            Err(FormulaError::InvalidReference(_))
        ));

        // Anchored components never move, so they never leave the grid
        assert_eq!(shifted("=$A$1", -5, -5), "=$A$1");
    }

    #[test]
    fn test_shift_no_references() {
        assert_eq!(shifted("=1+2", 4, 4), "=1+2");
        assert_eq!(shifted("=\"B2\"&1", 4, 4), "=\"B2\"&1");
    }
}

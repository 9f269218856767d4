//! Compiled formulas and their memoized result

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{evaluate, Grid};
use crate::lexer::{tokenize, Token};
use crate::parser::{build, ParseOptions};
use crate::rewrite::shift_references;
use feuille_core::Value;
use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

/// A parsed formula together with its single-slot result cache
///
/// Everything but the cache is immutable. The cache is filled by the first
/// [`Formula::exec`] and only emptied by [`Formula::reset_cache`]; whether the
/// cached result is still up to date is the owner's business.
///
/// The cache uses interior mutability so that a grid owning its formulas can
/// evaluate them while being borrowed as the [`Grid`]. A `Formula` must not be
/// shared across threads without external synchronization.
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    expr: FormulaExpr,
    references: Vec<Token>,
    options: ParseOptions,
    cache: RefCell<Option<Option<Value>>>,
}

impl Formula {
    /// Parse a formula with the default options
    ///
    /// # Example
    /// ```rust
    /// use feuille_formula::Formula;
    ///
    /// let formula = Formula::parse("=A1 + $B$2").unwrap();
    /// assert_eq!(formula.to_string(), "=A1 + $B$2");
    /// assert_eq!(formula.references().len(), 2);
    /// ```
    pub fn parse(source: &str) -> FormulaResult<Self> {
        Self::parse_with(source, ParseOptions::default())
    }

    /// Parse a formula with explicit options
    pub fn parse_with(source: &str, options: ParseOptions) -> FormulaResult<Self> {
        if !source.starts_with('=') {
            return Err(FormulaError::MalformedExpression(
                "formula must start with '='".into(),
            ));
        }

        let tokens = tokenize(source)?;
        let expr = build(&tokens, &options)?;
        let references = tokens.into_iter().filter(Token::is_reference).collect();

        Ok(Self {
            source: source.to_string(),
            expr,
            references,
            options,
            cache: RefCell::new(None),
        })
    }

    /// Evaluate the formula, or return the cached result
    pub fn exec<G: Grid + ?Sized>(&self, grid: &G) -> FormulaResult<Option<Value>> {
        if let Some(cached) = self.cache.borrow().as_ref() {
            log::debug!("cache hit for {}", self.source);
            return Ok(cached.clone());
        }

        log::debug!("evaluating {}", self.source);
        let value = evaluate(&self.expr, grid)?;
        *self.cache.borrow_mut() = Some(value.clone());
        Ok(value)
    }

    /// Forget the cached result
    pub fn reset_cache(&self) {
        *self.cache.borrow_mut() = None;
    }

    /// Result of the last evaluation since the last reset
    pub fn cached_value(&self) -> FormulaResult<Option<Value>> {
        self.cache
            .borrow()
            .clone()
            .ok_or(FormulaError::NoCachedValue)
    }

    /// Check if a result is cached
    pub fn is_cached(&self) -> bool {
        self.cache.borrow().is_some()
    }

    /// Build the formula obtained by copying this one `drow` rows down and
    /// `dcol` columns right
    ///
    /// Relative components of every reference are shifted, anchored (`$`)
    /// ones are kept. The result is a new, uncached formula parsed with the
    /// same options; `self` is left untouched.
    pub fn relative_to<G: Grid + ?Sized>(
        &self,
        grid: &G,
        drow: i64,
        dcol: i64,
    ) -> FormulaResult<Formula> {
        let source = shift_references(&self.source, &self.references, grid, drow, dcol)?;
        log::debug!("rewrote {} as {} ({:+}, {:+})", self.source, source, drow, dcol);
        Formula::parse_with(&source, self.options)
    }

    /// Original source text, including the leading `=`
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Expression tree
    pub fn expr(&self) -> &FormulaExpr {
        &self.expr
    }

    /// Reference tokens, in source order
    pub fn references(&self) -> &[Token] {
        &self.references
    }

    /// Options the formula was parsed with
    pub fn options(&self) -> ParseOptions {
        self.options
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Precedence;
    use feuille_core::CellPos;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Grid counting how often each reference is resolved
    #[derive(Default)]
    struct CountingGrid {
        cells: HashMap<CellPos, Value>,
        lookups: Cell<usize>,
    }

    impl CountingGrid {
        fn set(&mut self, reference: &str, value: Value) {
            self.cells.insert(CellPos::parse(reference).unwrap(), value);
        }
    }

    impl Grid for CountingGrid {
        fn resolve_value(&self, reference: &str) -> FormulaResult<Option<Value>> {
            self.lookups.set(self.lookups.get() + 1);
            let pos = self.resolve_position(reference)?;
            Ok(self.cells.get(&pos).cloned())
        }

        fn resolve_position(&self, reference: &str) -> FormulaResult<CellPos> {
            Ok(CellPos::parse(reference)?)
        }
    }

    #[test]
    fn test_round_trip_source() {
        for source in ["=1+2", "= A1 *  $B$2 ", "=\"a\\\"b\"&C3", "=SUM(A1)", "=--5"] {
            let formula = Formula::parse(source).unwrap();
            assert_eq!(formula.to_string(), source);
            assert_eq!(formula.source(), source);
        }
    }

    #[test]
    fn test_references_in_source_order() {
        let formula = Formula::parse("=B2+A1*$C$3").unwrap();
        let refs: Vec<&str> = formula.references().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(refs, vec!["B2", "A1", "$C$3"]);
    }

    #[test]
    fn test_parse_requires_prefix() {
        assert!(matches!(
            Formula::parse("1+2"),
            Err(FormulaError::MalformedExpression(_))
        ));
        assert!("=1+".parse::<Formula>().is_err());
    }

    #[test]
    fn test_exec_caches_result() {
        let mut grid = CountingGrid::default();
        grid.set("A1", Value::Number(2.0));
        grid.set("B1", Value::Number(3.0));

        let formula = Formula::parse("=A1*B1+A1").unwrap();
        assert!(!formula.is_cached());

        let first = formula.exec(&grid).unwrap();
        let lookups = grid.lookups.get();
        assert_eq!(lookups, 3);

        grid.set("A1", Value::Number(100.0));
        let second = formula.exec(&grid).unwrap();

        assert_eq!(first, Some(Value::Number(8.0)));
        assert_eq!(second, first);
        assert_eq!(grid.lookups.get(), lookups);
        assert_eq!(formula.cached_value().unwrap(), first);
    }

    #[test]
    fn test_reset_cache() {
        let mut grid = CountingGrid::default();
        grid.set("A1", Value::Number(1.0));

        let formula = Formula::parse("=A1+1").unwrap();
        assert_eq!(formula.cached_value(), Err(FormulaError::NoCachedValue));

        assert_eq!(formula.exec(&grid).unwrap(), Some(Value::Number(2.0)));
        grid.set("A1", Value::Number(10.0));

        formula.reset_cache();
        assert_eq!(formula.cached_value(), Err(FormulaError::NoCachedValue));
        assert_eq!(formula.exec(&grid).unwrap(), Some(Value::Number(11.0)));
    }

    #[test]
    fn test_empty_result_is_cached() {
        let grid = CountingGrid::default();
        let formula = Formula::parse("=A1").unwrap();

        assert_eq!(formula.exec(&grid).unwrap(), None);
        assert_eq!(formula.cached_value().unwrap(), None);
        assert_eq!(formula.exec(&grid).unwrap(), None);
        assert_eq!(grid.lookups.get(), 1);
    }

    #[test]
    fn test_failed_exec_is_not_cached() {
        let grid = CountingGrid::default();
        let formula = Formula::parse("=SUM(A1)").unwrap();

        assert_eq!(
            formula.exec(&grid),
            Err(FormulaError::UnsupportedFunctionCall("SUM".into()))
        );
        assert_eq!(formula.cached_value(), Err(FormulaError::NoCachedValue));
    }

    #[test]
    fn test_testable_values() {
        let grid = CountingGrid::default();
        let value = |s: &str| Formula::parse(s).unwrap().exec(&grid).unwrap();

        assert_eq!(value("=1-2-3"), Some(Value::Number(-4.0)));
        assert_eq!(value("=--5"), Some(Value::Number(5.0)));
        assert_eq!(value("=50%"), Some(Value::Number(0.5)));
    }

    #[test]
    fn test_precedence_convention() {
        let grid = CountingGrid::default();

        let conventional = Formula::parse("=1+2*3").unwrap();
        assert_eq!(conventional.exec(&grid).unwrap(), Some(Value::Number(7.0)));

        let legacy = Formula::parse_with("=1+2*3", ParseOptions::tightest_first()).unwrap();
        assert_eq!(legacy.options().precedence, Precedence::TightestFirst);
        assert_eq!(legacy.exec(&grid).unwrap(), Some(Value::Number(9.0)));
    }

    #[test]
    fn test_relative_to_shifts_and_keeps_options() {
        let grid = CountingGrid::default();
        let legacy = Formula::parse_with("=A1+2*3", ParseOptions::tightest_first()).unwrap();

        let shifted = legacy.relative_to(&grid, 1, 1).unwrap();
        assert_eq!(shifted.source(), "=B2+2*3");
        assert_eq!(shifted.options(), legacy.options());
        assert_eq!(legacy.source(), "=A1+2*3");
    }

    #[test]
    fn test_relative_to_is_uncached() {
        let mut grid = CountingGrid::default();
        grid.set("A2", Value::Number(4.0));

        let formula = Formula::parse("=A1").unwrap();
        formula.exec(&grid).unwrap();

        let shifted = formula.relative_to(&grid, 1, 0).unwrap();
        assert!(!shifted.is_cached());
        assert!(formula.is_cached());
        assert_eq!(shifted.exec(&grid).unwrap(), Some(Value::Number(4.0)));
    }
}

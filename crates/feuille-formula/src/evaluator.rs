//! Formula evaluator
//!
//! Evaluates expression trees against a [`Grid`] to produce values.

use crate::ast::{FormulaExpr, Operator};
use crate::error::{FormulaError, FormulaResult};
use feuille_core::{display_text, strict_cmp, strict_eq, to_number, CellPos, Value};
use std::cmp::Ordering;

/// Cell lookups needed by the formula engine
///
/// The engine never assumes how cells are stored: it only asks the grid for
/// the value and the position behind a reference text.
pub trait Grid {
    /// Current value of the reference's anchor cell
    ///
    /// Returns `None` for a cell without content. A cell holding a formula is
    /// evaluated (through its cache) before its value is returned.
    fn resolve_value(&self, reference: &str) -> FormulaResult<Option<Value>>;

    /// Absolute position of the reference's anchor cell
    fn resolve_position(&self, reference: &str) -> FormulaResult<CellPos>;
}

/// Evaluate an expression tree
///
/// Children are evaluated left to right before their operator runs. There is
/// no cycle detection: a formula that reaches itself through the grid recurses
/// until the stack is exhausted.
pub fn evaluate<G: Grid + ?Sized>(expr: &FormulaExpr, grid: &G) -> FormulaResult<Option<Value>> {
    match expr {
        FormulaExpr::Number(n) => Ok(Some(Value::Number(*n))),
        FormulaExpr::Text(s) => Ok(Some(Value::Text(s.clone()))),
        FormulaExpr::Reference(reference) => grid.resolve_value(reference),
        FormulaExpr::Call(name) => Err(FormulaError::UnsupportedFunctionCall(name.clone())),

        FormulaExpr::Unary { op, operand } => {
            let value = evaluate(operand, grid)?;
            evaluate_unary_op(*op, value.as_ref())
        }

        FormulaExpr::Binary { op, left, right } => {
            let left = evaluate(left, grid)?;
            let right = evaluate(right, grid)?;
            evaluate_binary_op(*op, left.as_ref(), right.as_ref())
        }
    }
}

fn evaluate_unary_op(op: Operator, value: Option<&Value>) -> FormulaResult<Option<Value>> {
    let n = to_number(value);
    let result = match op {
        Operator::Percent => n / 100.0,
        Operator::UnaryPlus => n,
        Operator::UnaryMinus => -n,
        _ => return Err(FormulaError::UnsupportedOperator(op.symbol())),
    };
    Ok(Some(Value::Number(result)))
}

fn evaluate_binary_op(
    op: Operator,
    left: Option<&Value>,
    right: Option<&Value>,
) -> FormulaResult<Option<Value>> {
    let result = match op {
        // Arithmetic
        Operator::Add => Value::Number(to_number(left) + to_number(right)),
        Operator::Subtract => Value::Number(to_number(left) - to_number(right)),
        Operator::Multiply => Value::Number(to_number(left) * to_number(right)),
        Operator::Divide => Value::Number(to_number(left) / to_number(right)),
        Operator::Power => Value::Number(to_number(left).powf(to_number(right))),

        // Text
        Operator::Concat => {
            let mut s = display_text(left);
            s.push_str(&display_text(right));
            Value::Text(s)
        }

        // Comparison, no coercion
        Operator::Equal => Value::Boolean(strict_eq(left, right)),
        Operator::NotEqual => Value::Boolean(!strict_eq(left, right)),
        Operator::LessThan => Value::Boolean(compare(left, right, |o| o == Ordering::Less)),
        Operator::LessEqual => Value::Boolean(compare(left, right, |o| o != Ordering::Greater)),
        Operator::GreaterThan => Value::Boolean(compare(left, right, |o| o == Ordering::Greater)),
        Operator::GreaterEqual => Value::Boolean(compare(left, right, |o| o != Ordering::Less)),

        Operator::Range
        | Operator::Intersection
        | Operator::Union
        | Operator::UnaryPlus
        | Operator::UnaryMinus
        | Operator::Percent => return Err(FormulaError::UnsupportedOperator(op.symbol())),
    };
    Ok(Some(result))
}

/// Unordered operands (different types, NaN, missing) compare false
fn compare(left: Option<&Value>, right: Option<&Value>, pred: impl Fn(Ordering) -> bool) -> bool {
    strict_cmp(left, right).map_or(false, pred)
}

//! Formula parser
//!
//! Builds an expression tree from a token sequence by repeatedly choosing a
//! split operator. The token list is scanned right to left; parenthesized
//! groups are skipped as a whole, and the selected operator divides the list
//! into the slices its operands are built from.

use crate::ast::{Fixity, FormulaExpr, Operator};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Token, TokenKind};

/// Which operator becomes the split point of a token list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precedence {
    /// Split on the loosest-binding operator, so `1+2*3` is `1+(2*3)`
    #[default]
    Conventional,
    /// Split on the tightest-binding operator, so `1+2*3` is `(1+2)*3`
    ///
    /// Compatibility mode for sheets written against the legacy engine.
    TightestFirst,
}

impl Precedence {
    /// Whether `candidate`, found left of `current`, replaces it
    fn prefers(self, candidate: Operator, current: Operator) -> bool {
        let (cand, cur) = (candidate.precedence(), current.precedence());
        let prefix = candidate.fixity() == Fixity::Prefix;

        // Ties keep the rightmost binary operator (left-associative) but move
        // to the leftmost prefix operator (right-to-left chains).
        match (self, prefix) {
            (Precedence::Conventional, false) => cand > cur,
            (Precedence::Conventional, true) => cand >= cur,
            (Precedence::TightestFirst, false) => cand < cur,
            (Precedence::TightestFirst, true) => cand <= cur,
        }
    }
}

/// Options controlling how formulas are parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Split-point selection rule
    pub precedence: Precedence,
}

impl ParseOptions {
    /// Options reproducing the legacy tightest-first split rule
    pub fn tightest_first() -> Self {
        Self {
            precedence: Precedence::TightestFirst,
        }
    }
}

/// Parse a formula string into an expression tree
///
/// # Example
/// ```rust
/// use feuille_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=(A1+$B$2)*50%").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    if !formula.starts_with('=') {
        return Err(FormulaError::MalformedExpression(
            "formula must start with '='".into(),
        ));
    }
    let tokens = tokenize(formula)?;
    build(&tokens, &ParseOptions::default())
}

/// Build an expression tree from a token sequence
pub fn build(tokens: &[Token], options: &ParseOptions) -> FormulaResult<FormulaExpr> {
    let expr = build_slice(tokens, options)?;
    log::trace!("built expression {:?}", expr);
    Ok(expr)
}

fn build_slice(tokens: &[Token], options: &ParseOptions) -> FormulaResult<FormulaExpr> {
    let last = match tokens {
        [] => {
            return Err(FormulaError::MalformedExpression("missing operand".into()));
        }
        [token] => return build_leaf(token),
        _ => tokens.len() - 1,
    };

    if tokens[last].is_operator(")") {
        let open = matching_open(tokens, last)?;

        // (…) around the whole slice
        if open == 0 {
            return build_slice(&tokens[1..last], options);
        }

        // NAME(…) around the whole slice
        if open == 1 && tokens[0].kind == TokenKind::Call {
            return Ok(FormulaExpr::Call(tokens[0].text.clone()));
        }
    }

    let (idx, op) = find_split(tokens, options)?;
    let (left, right) = (&tokens[..idx], &tokens[idx + 1..]);

    match op.fixity() {
        Fixity::Postfix => {
            if !right.is_empty() {
                return Err(unexpected_after(&tokens[idx]));
            }
            Ok(FormulaExpr::Unary {
                op,
                operand: Box::new(build_slice(left, options)?),
            })
        }
        Fixity::Prefix => {
            if !left.is_empty() {
                return Err(FormulaError::MalformedExpression(format!(
                    "unexpected tokens before '{}' at offset {}",
                    tokens[idx].text, tokens[idx].start
                )));
            }
            Ok(FormulaExpr::Unary {
                op,
                operand: Box::new(build_slice(right, options)?),
            })
        }
        Fixity::Infix => Ok(FormulaExpr::Binary {
            op,
            left: Box::new(build_slice(left, options)?),
            right: Box::new(build_slice(right, options)?),
        }),
    }
}

fn build_leaf(token: &Token) -> FormulaResult<FormulaExpr> {
    match token.kind {
        TokenKind::Number => {
            let n = token
                .text
                .replacen(',', ".", 1)
                .parse()
                .unwrap_or(f64::NAN);
            Ok(FormulaExpr::Number(n))
        }
        TokenKind::String => {
            let inner = &token.text[1..token.text.len() - 1];
            Ok(FormulaExpr::Text(inner.replace("\\\"", "\"")))
        }
        TokenKind::Reference => Ok(FormulaExpr::Reference(token.text.clone())),
        TokenKind::Call => Ok(FormulaExpr::Call(token.text.clone())),
        TokenKind::Operator => Err(FormulaError::MalformedExpression(format!(
            "unexpected operator '{}' at offset {}",
            token.text, token.start
        ))),
    }
}

/// Select the operator the slice is split on
fn find_split(tokens: &[Token], options: &ParseOptions) -> FormulaResult<(usize, Operator)> {
    let mut best: Option<(usize, Operator)> = None;
    let mut i = tokens.len();

    while i > 0 {
        i -= 1;
        let token = &tokens[i];
        if token.kind != TokenKind::Operator {
            continue;
        }

        if token.is_operator(")") {
            i = matching_open(tokens, i)?;
            if i > 0 && tokens[i - 1].kind == TokenKind::Call {
                i -= 1;
            }
            continue;
        }

        if token.is_operator("(") {
            return Err(FormulaError::MalformedExpression(format!(
                "unbalanced '(' at offset {}",
                token.start
            )));
        }

        // Unknown symbols never split
        let Some(mut op) = Operator::from_symbol(&token.text) else {
            continue;
        };
        if is_prefix_position(tokens, i) {
            if let Some(unary) = op.to_unary() {
                op = unary;
            }
        }

        let replace = match best {
            None => true,
            Some((_, current)) => options.precedence.prefers(op, current),
        };
        if replace {
            best = Some((i, op));
        }
    }

    best.ok_or_else(|| {
        let start = tokens.first().map_or(0, |t| t.start);
        FormulaError::MalformedExpression(format!(
            "no operator to split on at offset {}",
            start
        ))
    })
}

/// A `+`/`-` is prefix when nothing precedes it, or an operator that expects
/// a right operand does
fn is_prefix_position(tokens: &[Token], i: usize) -> bool {
    match i.checked_sub(1).map(|j| &tokens[j]) {
        None => true,
        Some(prev) => {
            prev.kind == TokenKind::Operator && !prev.is_operator(")") && !prev.is_operator("%")
        }
    }
}

/// Index of the `(` matching the `)` at `close`
fn matching_open(tokens: &[Token], close: usize) -> FormulaResult<usize> {
    let mut depth = 0usize;
    for j in (0..close).rev() {
        if tokens[j].is_operator(")") {
            depth += 1;
        } else if tokens[j].is_operator("(") {
            if depth == 0 {
                return Ok(j);
            }
            depth -= 1;
        }
    }
    Err(FormulaError::MalformedExpression(format!(
        "unbalanced ')' at offset {}",
        tokens[close].start
    )))
}

fn unexpected_after(token: &Token) -> FormulaError {
    FormulaError::MalformedExpression(format!(
        "unexpected tokens after '{}' at offset {}",
        token.text, token.start
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_with(formula: &str, options: ParseOptions) -> FormulaResult<FormulaExpr> {
        build(&tokenize(formula)?, &options)
    }

    fn num(n: f64) -> Box<FormulaExpr> {
        Box::new(FormulaExpr::Number(n))
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("=42").unwrap(), FormulaExpr::Number(42.0));
        assert_eq!(parse_formula("=3,14").unwrap(), FormulaExpr::Number(3.14));
        assert_eq!(parse_formula("=,5").unwrap(), FormulaExpr::Number(0.5));
        assert_eq!(parse_formula("=5,").unwrap(), FormulaExpr::Number(5.0));
    }

    #[test]
    fn test_parse_string() {
        let ast = parse_formula("=\"Hello\"").unwrap();
        assert_eq!(ast, FormulaExpr::Text("Hello".into()));

        let ast = parse_formula(r#"="say \"hi\"""#).unwrap();
        assert_eq!(ast, FormulaExpr::Text("say \"hi\"".into()));
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(
            parse_formula("=$B$2").unwrap(),
            FormulaExpr::Reference("$B$2".into())
        );
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        // Conventional reading: 1+(2*3)
        assert_eq!(
            parse_formula("=1+2*3").unwrap(),
            FormulaExpr::Binary {
                op: Operator::Add,
                left: num(1.0),
                right: Box::new(FormulaExpr::Binary {
                    op: Operator::Multiply,
                    left: num(2.0),
                    right: num(3.0),
                }),
            }
        );
    }

    #[test]
    fn test_parse_tightest_first_precedence() {
        // Legacy reading: (1+2)*3
        assert_eq!(
            parse_with("=1+2*3", ParseOptions::tightest_first()).unwrap(),
            FormulaExpr::Binary {
                op: Operator::Multiply,
                left: Box::new(FormulaExpr::Binary {
                    op: Operator::Add,
                    left: num(1.0),
                    right: num(2.0),
                }),
                right: num(3.0),
            }
        );
    }

    #[test]
    fn test_parse_left_associative() {
        // (1-2)-3 in both modes
        let expected = FormulaExpr::Binary {
            op: Operator::Subtract,
            left: Box::new(FormulaExpr::Binary {
                op: Operator::Subtract,
                left: num(1.0),
                right: num(2.0),
            }),
            right: num(3.0),
        };
        assert_eq!(parse_formula("=1-2-3").unwrap(), expected);
        assert_eq!(
            parse_with("=1-2-3", ParseOptions::tightest_first()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_unary_chain() {
        let expected = FormulaExpr::Unary {
            op: Operator::UnaryMinus,
            operand: Box::new(FormulaExpr::Unary {
                op: Operator::UnaryMinus,
                operand: num(5.0),
            }),
        };
        assert_eq!(parse_formula("=--5").unwrap(), expected);
        assert_eq!(
            parse_with("=--5", ParseOptions::tightest_first()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_unary_after_operator() {
        assert_eq!(
            parse_formula("=2*-3").unwrap(),
            FormulaExpr::Binary {
                op: Operator::Multiply,
                left: num(2.0),
                right: Box::new(FormulaExpr::Unary {
                    op: Operator::UnaryMinus,
                    operand: num(3.0),
                }),
            }
        );

        // Unary binds tighter than power
        assert_eq!(
            parse_formula("=-2^2").unwrap(),
            FormulaExpr::Binary {
                op: Operator::Power,
                left: Box::new(FormulaExpr::Unary {
                    op: Operator::UnaryMinus,
                    operand: num(2.0),
                }),
                right: num(2.0),
            }
        );
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(
            parse_formula("=50%").unwrap(),
            FormulaExpr::Unary {
                op: Operator::Percent,
                operand: num(50.0),
            }
        );

        // Operator after % is binary
        assert!(matches!(
            parse_formula("=50%+1").unwrap(),
            FormulaExpr::Binary {
                op: Operator::Add,
                ..
            }
        ));

        // Operator after ) is binary
        assert!(matches!(
            parse_formula("=(1+2)-3").unwrap(),
            FormulaExpr::Binary {
                op: Operator::Subtract,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_parentheses() {
        assert_eq!(
            parse_formula("=(1+2)*3").unwrap(),
            FormulaExpr::Binary {
                op: Operator::Multiply,
                left: Box::new(FormulaExpr::Binary {
                    op: Operator::Add,
                    left: num(1.0),
                    right: num(2.0),
                }),
                right: num(3.0),
            }
        );

        // Not fully wrapped: (1)+(2)
        assert!(matches!(
            parse_formula("=(1)+(2)").unwrap(),
            FormulaExpr::Binary {
                op: Operator::Add,
                ..
            }
        ));

        assert_eq!(parse_formula("=((7))").unwrap(), FormulaExpr::Number(7.0));
    }

    #[test]
    fn test_parse_comparison_is_loosest() {
        assert!(matches!(
            parse_formula("=A1&\"x\"=B1").unwrap(),
            FormulaExpr::Binary {
                op: Operator::Equal,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_call() {
        assert_eq!(
            parse_formula("=SUM(A1)").unwrap(),
            FormulaExpr::Call("SUM".into())
        );
        assert!(matches!(
            parse_formula("=SUM(A1;B1)+1").unwrap(),
            FormulaExpr::Binary {
                op: Operator::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_errors() {
        let malformed = |f: &str| {
            matches!(
                parse_formula(f),
                Err(FormulaError::MalformedExpression(_))
            )
        };
        assert!(malformed("1+2"));
        assert!(malformed("="));
        assert!(malformed("=1+"));
        assert!(malformed("=*2"));
        assert!(malformed("=(1+2"));
        assert!(malformed("=1+2)"));
        assert!(malformed("=1 2"));
        assert!(malformed("=50%2"));
        assert!(malformed("=()"));
    }
}

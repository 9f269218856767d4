//! Formula expression tree types

/// Formula expression tree
///
/// A plain owned tree: every node is built from a disjoint slice of the
/// token sequence, so there is no sharing and no cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Leaves ===
    /// Numeric literal
    Number(f64),
    /// String literal, quotes removed
    Text(String),
    /// Cell reference, resolved through the grid at evaluation time
    Reference(String),
    /// Function call, recognized but not evaluable
    Call(String),

    // === Operators ===
    /// Prefix or postfix operation
    Unary {
        op: Operator,
        operand: Box<FormulaExpr>,
    },
    /// Binary operation
    Binary {
        op: Operator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
}

/// How an operator takes its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    /// Operand on the right (`-A1`)
    Prefix,
    /// Operand on the left (`50%`)
    Postfix,
    /// Operands on both sides
    Infix,
}

/// The closed set of formula operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Reference operators (reserved)
    Range,
    Intersection,
    Union,

    // Prefix and postfix
    UnaryPlus,
    UnaryMinus,
    Percent,

    // Arithmetic
    Power,
    Multiply,
    Divide,
    Add,
    Subtract,

    // Text
    Concat,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

/// Number of precedence levels
pub const PRECEDENCE_LEVELS: usize = 10;

impl Operator {
    /// Look up the operator written as `symbol` between or after operands
    ///
    /// `+` and `-` map to their binary form; see [`Operator::to_unary`].
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        let op = match symbol {
            ":" => Operator::Range,
            "!" => Operator::Intersection,
            "~" => Operator::Union,
            "%" => Operator::Percent,
            "^" => Operator::Power,
            "*" => Operator::Multiply,
            "/" => Operator::Divide,
            "+" => Operator::Add,
            "-" => Operator::Subtract,
            "&" => Operator::Concat,
            "=" => Operator::Equal,
            "<>" => Operator::NotEqual,
            "<" => Operator::LessThan,
            "<=" => Operator::LessEqual,
            ">" => Operator::GreaterThan,
            ">=" => Operator::GreaterEqual,
            _ => return None,
        };
        Some(op)
    }

    /// The prefix form of `+` and `-`
    pub fn to_unary(self) -> Option<Operator> {
        match self {
            Operator::Add => Some(Operator::UnaryPlus),
            Operator::Subtract => Some(Operator::UnaryMinus),
            _ => None,
        }
    }

    /// Index in the precedence table, 0 binds tightest
    pub fn precedence(self) -> usize {
        match self {
            Operator::Range => 0,
            Operator::Intersection => 1,
            Operator::Union => 2,
            Operator::UnaryPlus | Operator::UnaryMinus => 3,
            Operator::Percent => 4,
            Operator::Power => 5,
            Operator::Multiply | Operator::Divide => 6,
            Operator::Add | Operator::Subtract => 7,
            Operator::Concat => 8,
            Operator::Equal
            | Operator::NotEqual
            | Operator::LessThan
            | Operator::LessEqual
            | Operator::GreaterThan
            | Operator::GreaterEqual => 9,
        }
    }

    pub fn fixity(self) -> Fixity {
        match self {
            Operator::UnaryPlus | Operator::UnaryMinus => Fixity::Prefix,
            Operator::Percent => Fixity::Postfix,
            _ => Fixity::Infix,
        }
    }

    /// Symbol as written in formulas, `u.+` / `u.-` for the prefix forms
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Range => ":",
            Operator::Intersection => "!",
            Operator::Union => "~",
            Operator::UnaryPlus => "u.+",
            Operator::UnaryMinus => "u.-",
            Operator::Percent => "%",
            Operator::Power => "^",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Concat => "&",
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
        }
    }
}

//! Computed values and the coercion rules shared by the formula engine

use crate::DISPLAY_PRECISION;
use chrono::{Datelike, Duration, NaiveDate};
use std::cmp::Ordering;
use std::fmt;

/// Day zero of the serial date system
pub const DATE_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1899, 12, 30) {
    Some(date) => date,
    None => panic!("invalid serial date epoch"),
};

const MS_PER_DAY: f64 = 24.0 * 3600.0 * 1000.0;

/// Serial numbers beyond this many days cannot be represented as a date
const MAX_SERIAL_DAYS: f64 = 1.0e8;

/// A value produced by a literal, an operator or a cell lookup
///
/// There is no "empty" variant: a cell without content is `None` wherever an
/// operand may be missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
    /// Boolean value (VRAI/FAUX)
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
}

impl Value {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Get the value as a number, if it is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_text(Some(self)))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

/// Coerce an operand to a number for arithmetic
///
/// Never fails: text that is not a number becomes `NaN`, which then
/// propagates through arithmetic.
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => 0.0,
        Some(Value::Number(n)) => *n,
        Some(Value::Text(s)) => parse_numeric_text(s),
        Some(Value::Date(d)) => date_to_serial(*d),
        Some(Value::Boolean(true)) => 1.0,
        Some(Value::Boolean(false)) => 0.0,
    }
}

/// Native numeric parse of a text operand
///
/// Blank text is zero. Decimal literals use `.`, and `0x`/`0o`/`0b`
/// prefixed integers are accepted. Anything else is `NaN`.
fn parse_numeric_text(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }

    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match t.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&t[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // f64::from_str also takes "inf" and "nan", which are not numbers here
    if !t
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return f64::NAN;
    }

    t.parse().unwrap_or(f64::NAN)
}

/// Convert a date to its serial number (days since 1899-12-30)
///
/// # Example
/// ```rust
/// use chrono::NaiveDate;
/// use feuille_core::date_to_serial;
///
/// let date = NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();
/// assert_eq!(date_to_serial(date), 1.0);
/// ```
pub fn date_to_serial(date: NaiveDate) -> f64 {
    let elapsed = date.signed_duration_since(DATE_EPOCH).num_milliseconds() as f64;
    round_to(elapsed / MS_PER_DAY, 7)
}

/// Convert a serial number back to a date
///
/// Fractional days are truncated. Returns `None` for serials that are not
/// finite or that fall outside the representable calendar.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL_DAYS {
        return None;
    }
    DATE_EPOCH.checked_add_signed(Duration::days(serial.trunc() as i64))
}

fn round_to(n: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (n * factor).round() / factor
}

/// Round to `digits` significant digits
///
/// ```rust
/// use feuille_core::value::round_significant;
///
/// assert_eq!(round_significant(0.123456789, 7), 0.1234568);
/// assert_eq!(round_significant(123456789.0, 7), 123456800.0);
/// ```
pub fn round_significant(n: f64, digits: usize) -> f64 {
    if !n.is_finite() || n == 0.0 || digits == 0 {
        return n;
    }
    format!("{:.*e}", digits - 1, n).parse().unwrap_or(n)
}

/// Default text rendering of an operand, as used by concatenation
///
/// - Numbers keep 7 significant digits and use `,` as decimal separator
/// - Booleans render as `VRAI` / `FAUX`
/// - Dates render as `dd/mm/yyyy`
/// - A missing operand renders as the empty string
pub fn display_text(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::Number(n)) => format_number(*n),
        Some(Value::Text(s)) => s.clone(),
        Some(Value::Boolean(true)) => "VRAI".to_string(),
        Some(Value::Boolean(false)) => "FAUX".to_string(),
        Some(Value::Date(d)) => format!("{:02}/{:02}/{:04}", d.day(), d.month(), d.year()),
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let rounded = round_significant(n, DISPLAY_PRECISION);

    // -0 renders as 0
    if rounded == 0.0 {
        return "0".to_string();
    }

    let magnitude = rounded.abs();
    let text = if magnitude >= 1e21 || magnitude < 1e-6 {
        exponent_form(rounded)
    } else {
        rounded.to_string()
    };
    text.replace('.', ",")
}

/// `1e+21`, `1.5e-7`: shortest mantissa, explicitly signed exponent
fn exponent_form(n: f64) -> String {
    let text = format!("{:e}", n);
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => text,
    }
}

/// Strict equality: same variant and same value, no coercion
///
/// `NaN` is never equal to anything. Two missing operands are equal.
pub fn strict_eq(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x == y,
        (Some(Value::Text(x)), Some(Value::Text(y))) => x == y,
        (Some(Value::Boolean(x)), Some(Value::Boolean(y))) => x == y,
        (Some(Value::Date(x)), Some(Value::Date(y))) => x == y,
        _ => false,
    }
}

/// Strict ordering: only values of the same variant are ordered
pub fn strict_cmp(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    match (a?, b?) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

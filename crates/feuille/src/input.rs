//! Interpretation of text typed into a cell

use crate::sheet::CellContent;
use chrono::{Duration, NaiveDate};
use feuille_core::{round_significant, to_number, Value, DISPLAY_PRECISION};
use feuille_formula::{Formula, FormulaResult, ParseOptions};

/// Turn typed text into cell content
///
/// Rules, first match wins:
/// - `VRAI` / `FAUX` are booleans
/// - blank text is kept as text
/// - text starting with `=` is a formula
/// - numbers, with `,` as decimal separator and no-break spaces ignored
/// - numbers followed by `%` (divided by 100) or `€`
/// - `d/m/y` dates, two-digit years meaning 19xx
/// - anything else is text
///
/// Only formula parsing can fail.
///
/// # Example
/// ```rust
/// use feuille::{parse_input, CellContent, ParseOptions, Value};
///
/// let content = parse_input("12,5 %", &ParseOptions::default()).unwrap();
/// assert!(matches!(content, CellContent::Value(Value::Number(n)) if n == 0.125));
/// ```
pub fn parse_input(text: &str, options: &ParseOptions) -> FormulaResult<CellContent> {
    match text {
        "VRAI" => return Ok(Value::Boolean(true).into()),
        "FAUX" => return Ok(Value::Boolean(false).into()),
        _ => {}
    }

    if text.trim().is_empty() {
        return Ok(Value::text(text).into());
    }

    if text.starts_with('=') {
        return Ok(Formula::parse_with(text, *options)?.into());
    }

    if let Some(n) = parse_number(text) {
        return Ok(Value::Number(n).into());
    }

    let trimmed = text.trim_end();
    if let Some(n) = trimmed.strip_suffix('%').and_then(parse_number) {
        return Ok(Value::Number(round_significant(n / 100.0, DISPLAY_PRECISION)).into());
    }
    if let Some(n) = trimmed.strip_suffix('€').and_then(parse_number) {
        return Ok(Value::Number(n).into());
    }

    if let Some(date) = parse_date(text) {
        return Ok(Value::Date(date).into());
    }

    Ok(Value::text(text).into())
}

fn parse_number(text: &str) -> Option<f64> {
    if text.trim().is_empty() {
        return None;
    }
    let normalized: String = text.replacen(',', ".", 1).replace('\u{a0}', "");
    let n = to_number(Some(&Value::text(normalized)));
    (!n.is_nan()).then_some(n)
}

/// Parse `d/m/y`
///
/// Out of range days and months roll over into the following ones, so
/// `31/4/2024` is the 1st of May.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('/');
    let (d, m, y) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let day = parse_int(d)?;
    let month = parse_int(m)?;
    let mut year = parse_int(y)?;
    if (0..100).contains(&year) {
        year += 1900;
    }

    // months counted from zero
    let months = year.checked_mul(12)?.checked_add(month - 1)?;
    let first = NaiveDate::from_ymd_opt(
        i32::try_from(months.div_euclid(12)).ok()?,
        u32::try_from(months.rem_euclid(12) + 1).ok()?,
        1,
    )?;
    first.checked_add_signed(Duration::try_days(day - 1)?)
}

fn parse_int(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

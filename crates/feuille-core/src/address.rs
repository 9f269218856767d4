//! Cell addresses in A1 notation

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Absolute position of a cell (e.g. "A1" is row 1, column 1)
///
/// Both components are 1-based, as displayed in the grid headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based, A=1, B=2, ..., Z=26, AA=27)
    pub col: u32,
}

impl CellPos {
    /// Create a new cell position
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell position from A1-style notation
    ///
    /// Anchoring markers (`$`) are ignored wherever they appear.
    ///
    /// # Examples
    /// ```
    /// use feuille_core::CellPos;
    ///
    /// let pos = CellPos::parse("A1").unwrap();
    /// assert_eq!(pos, CellPos::new(1, 1));
    ///
    /// let pos = CellPos::parse("$AB$12").unwrap();
    /// assert_eq!(pos, CellPos::new(12, 28));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let clean: String = s.trim().chars().filter(|&c| c != '$').collect();
        if clean.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let col_end = clean
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(clean.len());

        if col_end == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let row_str = &clean[col_end..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let col = letters_to_column(&clean[..col_end])?;

        Ok(Self { row, col })
    }

    /// Format as A1-style string, without anchoring markers
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_to_letters(self.col), self.row)
    }

    /// Format as A1-style string with the given anchoring markers
    pub fn to_a1_anchored(&self, anchors: Anchors) -> String {
        let mut result = String::new();
        if anchors.col {
            result.push('$');
        }
        result.push_str(&column_to_letters(self.col));
        if anchors.row {
            result.push('$');
        }
        result.push_str(&self.row.to_string());
        result
    }

    /// Move by a signed offset, `None` if a component would leave the grid origin
    pub fn offset(&self, drow: i64, dcol: i64) -> Option<CellPos> {
        let row = i64::from(self.row) + drow;
        let col = i64::from(self.col) + dcol;
        if row < 1 || col < 1 {
            return None;
        }
        Some(CellPos {
            row: u32::try_from(row).ok()?,
            col: u32::try_from(col).ok()?,
        })
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

impl FromStr for CellPos {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Which components of a reference are anchored with `$`
///
/// An anchored component is left untouched when a formula is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchors {
    pub row: bool,
    pub col: bool,
}

impl Anchors {
    /// Detect the anchors of a reference text
    ///
    /// The column is anchored when the text starts with `$`, the row when a
    /// `$` appears anywhere after the first character.
    pub fn of(reference: &str) -> Self {
        Self {
            col: reference.starts_with('$'),
            row: reference.rfind('$').map_or(false, |idx| idx > 0),
        }
    }
}

/// Convert a column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
pub fn column_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to a column number (A = 1, Z = 26, AA = 27, etc.)
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .ok_or_else(|| Error::ColumnOutOfBounds(letters.to_string()))?;
    }

    Ok(col)
}

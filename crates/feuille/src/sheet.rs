//! In-memory sheet

use crate::error::{Error, Result};
use crate::input::parse_input;
use ahash::AHashMap;
use chrono::Duration;
use feuille_core::{CellPos, Value};
use feuille_formula::{Formula, FormulaResult, Grid, ParseOptions};

/// Sheet-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSettings {
    /// Number of rows (1-based addresses go up to this value)
    pub rows: u32,
    /// Number of columns
    pub cols: u32,
    /// Options used when parsing formulas typed into the sheet
    pub parse_options: ParseOptions,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            rows: 100,
            cols: 26,
            parse_options: ParseOptions::default(),
        }
    }
}

/// Raw content of a cell
#[derive(Debug, Clone)]
pub enum CellContent {
    /// Literal value
    Value(Value),
    /// Formula, evaluated on demand
    Formula(Formula),
}

impl CellContent {
    /// Check if this is a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula(_))
    }

    /// Get the formula, if any
    pub fn as_formula(&self) -> Option<&Formula> {
        match self {
            CellContent::Formula(f) => Some(f),
            CellContent::Value(_) => None,
        }
    }
}

impl From<Value> for CellContent {
    fn from(value: Value) -> Self {
        CellContent::Value(value)
    }
}

impl From<Formula> for CellContent {
    fn from(formula: Formula) -> Self {
        CellContent::Formula(formula)
    }
}

/// Direction of a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillDirection {
    Down,
    Up,
    Right,
    Left,
}

impl FillDirection {
    /// Row and column offset of one step
    pub fn delta(self) -> (i64, i64) {
        match self {
            FillDirection::Down => (1, 0),
            FillDirection::Up => (-1, 0),
            FillDirection::Right => (0, 1),
            FillDirection::Left => (0, -1),
        }
    }

    /// Increment applied to numbers and dates per step
    fn step(self) -> i64 {
        let (drow, dcol) = self.delta();
        drow + dcol
    }
}

/// A bounded grid of cells
///
/// Cells are stored sparsely; an empty cell is simply absent. Formula
/// results are memoized inside each [`Formula`] and are not invalidated when
/// another cell changes: call [`Sheet::recalculate`] after editing.
///
/// # Example
/// ```rust
/// use feuille::{Sheet, Value};
///
/// let mut sheet = Sheet::new();
/// sheet.set_input("A1", "2").unwrap();
/// sheet.set_input("A2", "=A1*3").unwrap();
///
/// assert_eq!(sheet.value("A2").unwrap(), Some(Value::Number(6.0)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    settings: SheetSettings,
    cells: AHashMap<CellPos, CellContent>,
}

impl Sheet {
    /// Create an empty sheet with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sheet with the given settings
    pub fn with_settings(settings: SheetSettings) -> Self {
        Self {
            settings,
            cells: AHashMap::new(),
        }
    }

    /// Get the settings
    pub fn settings(&self) -> &SheetSettings {
        &self.settings
    }

    /// Parse an address and check it lies inside the sheet
    pub fn position_of(&self, reference: &str) -> Result<CellPos> {
        let pos = CellPos::parse(reference)?;
        self.check_bounds(pos)?;
        Ok(pos)
    }

    fn check_bounds(&self, pos: CellPos) -> Result<()> {
        if pos.row > self.settings.rows || pos.col > self.settings.cols {
            return Err(Error::OutOfBounds {
                reference: pos.to_a1(),
                rows: self.settings.rows,
                cols: self.settings.cols,
            });
        }
        Ok(())
    }

    /// Set a cell from typed text
    ///
    /// Empty text clears the cell.
    pub fn set_input(&mut self, reference: &str, text: &str) -> Result<()> {
        let pos = self.position_of(reference)?;
        if text.is_empty() {
            self.cells.remove(&pos);
            return Ok(());
        }
        let content = parse_input(text, &self.settings.parse_options)?;
        self.cells.insert(pos, content);
        Ok(())
    }

    /// Set a cell to a literal value
    pub fn set_value<V: Into<Value>>(&mut self, reference: &str, value: V) -> Result<()> {
        let pos = self.position_of(reference)?;
        self.cells.insert(pos, CellContent::Value(value.into()));
        Ok(())
    }

    /// Set a cell to a formula (leading `=` included)
    pub fn set_formula(&mut self, reference: &str, source: &str) -> Result<()> {
        let pos = self.position_of(reference)?;
        let formula = Formula::parse_with(source, self.settings.parse_options)?;
        self.cells.insert(pos, CellContent::Formula(formula));
        Ok(())
    }

    /// Empty a cell, returning its previous content
    pub fn clear(&mut self, reference: &str) -> Result<Option<CellContent>> {
        let pos = self.position_of(reference)?;
        Ok(self.cells.remove(&pos))
    }

    /// Raw content of a cell
    pub fn content(&self, reference: &str) -> Result<Option<&CellContent>> {
        let pos = self.position_of(reference)?;
        Ok(self.cells.get(&pos))
    }

    /// Raw content at a position
    pub fn content_at(&self, pos: CellPos) -> Option<&CellContent> {
        self.cells.get(&pos)
    }

    /// Computed value of a cell
    ///
    /// Formulas are evaluated against this sheet, or answered from their
    /// cache.
    pub fn value(&self, reference: &str) -> Result<Option<Value>> {
        let pos = self.position_of(reference)?;
        Ok(self.value_at(pos)?)
    }

    fn value_at(&self, pos: CellPos) -> FormulaResult<Option<Value>> {
        match self.cells.get(&pos) {
            None => Ok(None),
            Some(CellContent::Value(v)) => Ok(Some(v.clone())),
            Some(CellContent::Formula(f)) => f.exec(self),
        }
    }

    /// Display text of a cell
    ///
    /// Formulas show their last computed result; a formula that was never
    /// calculated (or failed) shows as empty.
    pub fn text(&self, reference: &str) -> Result<String> {
        let pos = self.position_of(reference)?;
        let value = match self.cells.get(&pos) {
            None => None,
            Some(CellContent::Value(v)) => Some(v.clone()),
            Some(CellContent::Formula(f)) => f.cached_value().ok().flatten(),
        };
        Ok(feuille_core::display_text(value.as_ref()))
    }

    /// Iterate over every formula cell, in no particular order
    pub fn formulas(&self) -> impl Iterator<Item = (CellPos, &Formula)> {
        self.cells
            .iter()
            .filter_map(|(pos, content)| content.as_formula().map(|f| (*pos, f)))
    }

    /// Number of formula cells
    pub fn formula_count(&self) -> usize {
        self.formulas().count()
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Copy a cell to another one
    ///
    /// Formulas are rewritten for the move from `src` to `dst`; values are
    /// cloned. Copying an empty cell clears the destination.
    pub fn copy_cell(&mut self, src: &str, dst: &str) -> Result<()> {
        let src = self.position_of(src)?;
        let dst = self.position_of(dst)?;

        let drow = i64::from(dst.row) - i64::from(src.row);
        let dcol = i64::from(dst.col) - i64::from(src.col);

        let content = match self.cells.get(&src) {
            None => None,
            Some(CellContent::Value(v)) => Some(CellContent::Value(v.clone())),
            Some(CellContent::Formula(f)) => {
                Some(CellContent::Formula(f.relative_to(self, drow, dcol)?))
            }
        };

        match content {
            Some(content) => {
                self.cells.insert(dst, content);
            }
            None => {
                self.cells.remove(&dst);
            }
        }
        Ok(())
    }

    /// Repeat a cell `count` times in `direction`
    ///
    /// The n-th copy of a number is `n + step * n`, of a date `step * n` days
    /// later, where `step` is `1` going down or right and `-1` going up or
    /// left. Formulas are rewritten as if copied, text and booleans are
    /// repeated. The fill stops at the edge of the sheet; the number of cells
    /// written is returned.
    ///
    /// Nothing is written unless every copy can be built.
    pub fn fill(&mut self, src: &str, direction: FillDirection, count: usize) -> Result<usize> {
        let src = self.position_of(src)?;
        let Some(source) = self.cells.get(&src) else {
            return Ok(0);
        };

        let (drow, dcol) = direction.delta();
        let step = direction.step();
        let mut copies = Vec::new();

        for nb in 1..=count as i64 {
            let Some(dst) = src.offset(drow * nb, dcol * nb) else {
                break;
            };
            if self.check_bounds(dst).is_err() {
                break;
            }

            let content = match source {
                CellContent::Value(Value::Number(n)) => {
                    CellContent::Value(Value::Number(n + (nb * step) as f64))
                }
                CellContent::Value(Value::Date(d)) => {
                    let days = nb * step;
                    let date = Duration::try_days(days)
                        .and_then(|delta| d.checked_add_signed(delta))
                        .ok_or(Error::DateOutOfRange { date: *d, days })?;
                    CellContent::Value(Value::Date(date))
                }
                CellContent::Value(other) => CellContent::Value(other.clone()),
                CellContent::Formula(f) => {
                    CellContent::Formula(f.relative_to(self, drow * nb, dcol * nb)?)
                }
            };
            copies.push((dst, content));
        }

        let written = copies.len();
        self.cells.extend(copies);

        log::debug!("filled {} cells {:?} from {}", written, direction, src);
        Ok(written)
    }
}

impl Grid for Sheet {
    fn resolve_value(&self, reference: &str) -> FormulaResult<Option<Value>> {
        let pos = self.resolve_position(reference)?;
        self.value_at(pos)
    }

    fn resolve_position(&self, reference: &str) -> FormulaResult<CellPos> {
        Ok(self.position_of(reference)?)
    }
}

use std::collections::HashMap;
use std::fmt;

use super::error::{DataError, Result};

pub const COUNTRY_NAME: &str = "Country Name";
pub const INDICATOR_NAME: &str = "Indicator Name";
pub const INDICATOR_CODE: &str = "Indicator Code";

/// Columns every indicator table must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = [COUNTRY_NAME, INDICATOR_NAME, INDICATOR_CODE];

// ---------------------------------------------------------------------------
// Cell – a single value in the table
// ---------------------------------------------------------------------------

/// One cell of the indicator table.
///
/// Metadata columns hold text, year columns hold numbers; an empty
/// year cell is `Missing` and is carried as-is through every reshaping step.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Missing,
}

impl Cell {
    /// Numeric view of the cell. Text and missing cells yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.as_f64().is_none() && self.as_text().is_none()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Missing => write!(f, "NaN"),
        }
    }
}

/// Whether a column header names a year column (`"1960"`, `"2020"`, ...).
pub fn is_year_column(name: &str) -> bool {
    !name.is_empty() && name.len() <= 4 && name.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Table – rows = country × indicator, columns = metadata + years
// ---------------------------------------------------------------------------

/// Row-oriented indicator table. Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, checking that every row matches the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DataError::load(format!(
                "row {i} has {} cells but the table has {} columns",
                row.len(),
                columns.len()
            )));
        }
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Ok(Table {
            columns,
            index,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Year columns in table order.
    pub fn year_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| is_year_column(c))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<RowRef<'_>> {
        self.rows.get(i).map(|cells| RowRef {
            table: self,
            cells: cells.as_slice(),
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |cells| RowRef {
            table: self,
            cells: cells.as_slice(),
        })
    }

    /// Keep rows for which `keep` returns true, preserving order.
    pub(crate) fn retain_rows(&self, mut keep: impl FnMut(RowRef<'_>) -> bool) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|cells| {
                keep(RowRef {
                    table: self,
                    cells: cells.as_slice(),
                })
            })
            .cloned()
            .collect();
        Table {
            columns: self.columns.clone(),
            index: self.index.clone(),
            rows,
        }
    }

    /// Keep the columns at `positions` (in the given order) for every row.
    pub(crate) fn select_columns(&self, positions: &[usize]) -> Self {
        let columns: Vec<String> = positions.iter().map(|&p| self.columns[p].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|cells| positions.iter().map(|&p| cells[p].clone()).collect())
            .collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Table {
            columns,
            index,
            rows,
        }
    }

    /// Former columns become rows: one entry per column with that
    /// column's value for every source row.
    pub fn transpose(&self) -> TransposedTable {
        let entries = self
            .columns
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let values = self.rows.iter().map(|row| row[c].clone()).collect();
                (name.clone(), values)
            })
            .collect();
        TransposedTable { entries }
    }
}

/// Borrowed view of one table row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a Table,
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        let cells = self.cells;
        self.table.column_index(column).map(move |i| &cells[i])
    }

    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(Cell::as_text)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Cell::as_f64)
    }

    pub fn country(&self) -> Option<&'a str> {
        self.text(COUNTRY_NAME)
    }

    pub fn indicator_code(&self) -> Option<&'a str> {
        self.text(INDICATOR_CODE)
    }

    pub fn indicator_name(&self) -> Option<&'a str> {
        self.text(INDICATOR_NAME)
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}

// ---------------------------------------------------------------------------
// TransposedTable – columns as rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TransposedTable {
    entries: Vec<(String, Vec<Cell>)>,
}

impl TransposedTable {
    pub fn get(&self, column: &str) -> Option<&[Cell]> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, values)| values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Cell])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sample() -> Table {
        Table::new(
            vec![COUNTRY_NAME.into(), INDICATOR_CODE.into(), "1990".into()],
            vec![
                vec![text("India"), text("SP.POP.TOTL"), Cell::Number(870.0)],
                vec![text("Canada"), text("SP.POP.TOTL"), Cell::Missing],
            ],
        )
        .expect("valid table")
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::new(
            vec![COUNTRY_NAME.into(), "1990".into()],
            vec![vec![text("India")]],
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Load { .. }));
    }

    #[test]
    fn row_access_by_column_name() {
        let table = sample();
        let row = table.row(0).expect("row 0");
        assert_eq!(row.country(), Some("India"));
        assert_eq!(row.indicator_code(), Some("SP.POP.TOTL"));
        assert_eq!(row.number("1990"), Some(870.0));
        assert_eq!(row.indicator_name(), None);
        assert!(table.row(1).expect("row 1").get("1990").expect("cell").is_missing());
    }

    #[test]
    fn year_columns_are_detected() {
        assert!(is_year_column("1960"));
        assert!(!is_year_column("Country Name"));
        assert!(!is_year_column(""));
        assert_eq!(sample().year_columns().collect::<Vec<_>>(), vec!["1990"]);
    }

    #[test]
    fn transpose_turns_columns_into_rows() {
        let t = sample().transpose();
        assert_eq!(t.len(), 3);
        assert_eq!(
            t.get(COUNTRY_NAME).expect("country column"),
            &[text("India"), text("Canada")]
        );
        assert_eq!(t.get("1990").expect("year column")[1], Cell::Missing);
    }
}

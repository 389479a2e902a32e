use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single value in a stats table. The provider sends numbers, strings and
/// nulls; everything else is folded into one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Cell {
    #[default]
    Null,
    Num(f64),
    Text(String),
}

impl Cell {
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Null,
            serde_json::Value::Number(n) => n.as_f64().map(Cell::Num).unwrap_or(Cell::Null),
            serde_json::Value::String(s) => Cell::Text(s.clone()),
            serde_json::Value::Bool(b) => Cell::Num(if *b { 1.0 } else { 0.0 }),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Num(v) => v.is_nan(),
            Cell::Text(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Num(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Num(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("row has {got} cells but the table has {expected} columns")]
    RowWidth { expected: usize, got: usize },
    #[error("duplicate column {0}")]
    DuplicateColumn(String),
}

/// Ordered rows sharing one column set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl StatTable {
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(TableError::DuplicateColumn(col.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// The "no data" table: zero rows and zero columns.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Keep the desired names that this table actually carries, in the
    /// order they were asked for.
    pub fn available<S: AsRef<str>>(&self, desired: &[S]) -> Vec<String> {
        desired
            .iter()
            .map(|s| s.as_ref())
            .filter(|name| self.has_column(name))
            .map(str::to_string)
            .collect()
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        self.rows.get(index).map(|cells| RowRef {
            table: self,
            index,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> + '_ {
        self.rows.iter().enumerate().map(move |(index, cells)| RowRef {
            table: self,
            index,
            cells,
        })
    }

    pub fn raw_rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_values(&self, name: &str) -> Vec<&Cell> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        self.rows.iter().map(|row| &row[idx]).collect()
    }

    /// Project onto `names`. Unknown names are skipped.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> StatTable {
        let picked: Vec<(String, usize)> = names
            .iter()
            .filter_map(|n| {
                let n = n.as_ref();
                self.column_index(n).map(|idx| (n.to_string(), idx))
            })
            .collect();
        let mut seen = HashSet::new();
        let picked: Vec<(String, usize)> = picked
            .into_iter()
            .filter(|(name, _)| seen.insert(name.clone()))
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| picked.iter().map(|(_, idx)| row[*idx].clone()).collect())
            .collect();
        StatTable {
            columns: picked.into_iter().map(|(name, _)| name).collect(),
            rows,
        }
    }

    pub fn filter_rows(&self, mut keep: impl FnMut(&RowRef<'_>) -> bool) -> StatTable {
        let rows = self
            .rows()
            .filter(|row| keep(row))
            .map(|row| row.cells.to_vec())
            .collect();
        StatTable {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Drop rows holding a null in any of `names`. Missing columns count as null.
    pub fn drop_nulls<S: AsRef<str>>(&self, names: &[S]) -> StatTable {
        let idxs: Option<Vec<usize>> = names
            .iter()
            .map(|n| self.column_index(n.as_ref()))
            .collect();
        let Some(idxs) = idxs else {
            return StatTable {
                columns: self.columns.clone(),
                rows: Vec::new(),
            };
        };
        self.filter_rows(|row| idxs.iter().all(|idx| !row.cells[*idx].is_null()))
    }

    /// Append (or overwrite) a column computed per row.
    pub fn with_column(&self, name: &str, mut value: impl FnMut(&RowRef<'_>) -> Cell) -> StatTable {
        let values: Vec<Cell> = self.rows().map(|row| value(&row)).collect();
        let mut out = self.clone();
        match out.column_index(name) {
            Some(idx) => {
                for (row, v) in out.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                out.columns.push(name.to_string());
                for (row, v) in out.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        out
    }

    pub fn rename_columns(&mut self, mut rename: impl FnMut(&str) -> String) {
        for col in &mut self.columns {
            *col = rename(col);
        }
    }

    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }
}

/// Borrowed view of one player row.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a StatTable,
    index: usize,
    cells: &'a [Cell],
}

impl<'a> RowRef<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table.column_index(column).map(|idx| &self.cells[idx])
    }

    pub fn num(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Cell::as_f64)
    }

    pub fn text(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(Cell::as_str)
    }
}

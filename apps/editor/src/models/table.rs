//! Rectangular table grid carried by `table` blocks. Row 0 is the header row.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct TableData {
    rows: Vec<Vec<String>>,
}

impl From<Vec<Vec<String>>> for TableData {
    /// Pads ragged input so every row has the width of the widest one.
    fn from(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Self { rows }
    }
}

impl From<TableData> for Vec<Vec<String>> {
    fn from(table: TableData) -> Self {
        table.rows
    }
}

impl Default for TableData {
    /// 3×3 starter grid: one header row and two body rows.
    fn default() -> Self {
        let header = (1..=3).map(|c| format!("Header {c}")).collect();
        let mut rows = vec![header];
        for r in 1..=2 {
            rows.push((1..=3).map(|c| format!("Row {r}, Cell {c}")).collect());
        }
        Self { rows }
    }
}

impl TableData {
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }

    /// Appends an empty body row.
    pub fn add_row(&mut self) {
        let width = self.column_count().max(1);
        self.rows.push(vec![String::new(); width]);
    }

    /// Removes body row `row`. The header and the last body row cannot be removed.
    pub fn remove_row(&mut self, row: usize) -> Result<(), AppError> {
        if row == 0 {
            return Err(AppError::InvalidTableMutation(
                "The header row cannot be removed".to_string(),
            ));
        }
        if row >= self.rows.len() {
            return Err(AppError::InvalidTableMutation(format!(
                "Row {row} does not exist"
            )));
        }
        if self.rows.len() <= 2 {
            return Err(AppError::InvalidTableMutation(
                "A table must keep at least one body row".to_string(),
            ));
        }
        self.rows.remove(row);
        Ok(())
    }

    /// Appends a column; the header cell is labelled after its position.
    pub fn add_column(&mut self) {
        let next = self.column_count() + 1;
        if self.rows.is_empty() {
            self.rows.push(Vec::new());
        }
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.push(if i == 0 {
                format!("Header {next}")
            } else {
                String::new()
            });
        }
    }

    pub fn remove_column(&mut self, col: usize) -> Result<(), AppError> {
        let width = self.column_count();
        if col >= width {
            return Err(AppError::InvalidTableMutation(format!(
                "Column {col} does not exist"
            )));
        }
        if width <= 1 {
            return Err(AppError::InvalidTableMutation(
                "A table must keep at least one column".to_string(),
            ));
        }
        for row in &mut self.rows {
            row.remove(col);
        }
        Ok(())
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: String) -> Result<(), AppError> {
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or_else(|| {
                AppError::InvalidTableMutation(format!("Cell ({row}, {col}) does not exist"))
            })?;
        *cell = value;
        Ok(())
    }
}

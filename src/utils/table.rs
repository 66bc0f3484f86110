//! Table rendering utilities for CLI outputs.

use super::formatting::{pad_left, pad_right, visible_width};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

pub struct Column {
    pub header: String,
    pub width: usize,
    pub align: Align,
}

impl Column {
    pub fn new(header: &str) -> Self {
        Self {
            header: header.to_string(),
            width: UnicodeWidthStr::width(header),
            align: Align::Left,
        }
    }

    fn pad(&self, cell: &str) -> String {
        match self.align {
            Align::Left => pad_right(cell, self.width),
            Align::Right => pad_left(cell, self.width),
        }
    }
}

pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_headers(headers: &[&str]) -> Self {
        Self::new(headers.iter().map(|h| Column::new(h)).collect())
    }

    /// Right-align the columns at `indexes` (amounts, scores, counts).
    pub fn align_right(mut self, indexes: &[usize]) -> Self {
        for &i in indexes {
            if let Some(col) = self.columns.get_mut(i) {
                col.align = Align::Right;
            }
        }
        self
    }

    /// Adds a row and widens columns to fit it. Missing cells render empty.
    pub fn add_row(&mut self, row: Vec<String>) {
        for (col, cell) in self.columns.iter_mut().zip(row.iter()) {
            col.width = col.width.max(visible_width(cell));
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        // Header
        let header: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.pad(&c.header))
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');

        let rule: Vec<String> = self.columns.iter().map(|c| "-".repeat(c.width)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');

        // Rows
        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| col.pad(row.get(i).map(String::as_str).unwrap_or("")))
                .collect();
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_grow_to_fit_cells() {
        let mut t = Table::with_headers(&["ID", "Name"]);
        t.add_row(vec!["1".into(), "Jane Smith".into()]);
        let out = t.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID  Name");
        assert_eq!(lines[1], "--  ----------");
        assert_eq!(lines[2], "1   Jane Smith");
    }

    #[test]
    fn right_aligned_columns_pad_on_the_left() {
        let mut t = Table::with_headers(&["Name", "Score"]).align_right(&[1, 9]);
        t.add_row(vec!["Jane".into(), "9.5".into()]);
        t.add_row(vec!["John".into(), "10.0".into()]);
        let out = t.render();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Name  Score");
        assert_eq!(lines[2], "Jane    9.5");
        assert_eq!(lines[3], "John   10.0");
    }
}

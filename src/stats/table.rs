use anyhow::{ensure, Result};
use std::fmt;

/// A single table cell. Statistics produce integer counts, float summaries
/// (NaN marks an undefined value, e.g. an average over zero words) or
/// `(text, count)` pairs for ranked words and songs.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Count(usize),
    Number(f64),
    Entry(String, usize),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Count(n) => write!(f, "{n}"),
            Cell::Number(x) => write!(f, "{x:.3}"),
            Cell::Entry(text, n) => write!(f, "{text} ({n})"),
        }
    }
}

/// Row-labeled, column-labeled table accumulating statistic outputs.
///
/// Columns are timeframe bin labels in bin construction order; each
/// statistic function appends one or more uniquely labeled rows.
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    columns: Vec<String>,
    rows: Vec<(String, Vec<Cell>)>,
}

impl StatsTable {
    pub fn with_columns(columns: Vec<String>) -> Self {
        StatsTable {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_labels(&self) -> Vec<&str> {
        self.rows.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Append a row. The cell count must match the column count and the
    /// label must not already be present.
    pub fn push_row(&mut self, label: impl Into<String>, cells: Vec<Cell>) -> Result<()> {
        let label = label.into();
        ensure!(
            cells.len() == self.columns.len(),
            "row '{}' has {} cells for {} columns",
            label,
            cells.len(),
            self.columns.len()
        );
        ensure!(
            !self.rows.iter().any(|(l, _)| *l == label),
            "row '{}' already present in table",
            label
        );
        self.rows.push((label, cells));
        Ok(())
    }

    pub fn row(&self, label: &str) -> Option<&[Cell]> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, cells)| cells.as_slice())
    }

    /// Cell at a row/column intersection
    pub fn get(&self, row: &str, column: &str) -> Option<&Cell> {
        let col_idx = self.columns.iter().position(|c| c == column)?;
        self.row(row)?.get(col_idx)
    }

    /// Render as aligned plain text, one statistic per line
    pub fn render(&self) -> String {
        let label_width = self
            .rows
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0);
        let mut col_widths: Vec<usize> = self.columns.iter().map(String::len).collect();
        for (_, cells) in &self.rows {
            for (i, cell) in cells.iter().enumerate() {
                col_widths[i] = col_widths[i].max(cell.to_string().len());
            }
        }

        let mut out = String::new();
        out.push_str(&" ".repeat(label_width));
        for (column, &width) in self.columns.iter().zip(&col_widths) {
            out.push_str(&format!("  {column:>width$}"));
        }
        out.push('\n');
        for (label, cells) in &self.rows {
            out.push_str(&format!("{label:<label_width$}"));
            for (cell, &width) in cells.iter().zip(&col_widths) {
                out.push_str(&format!("  {:>width$}", cell.to_string()));
            }
            out.push('\n');
        }
        out
    }

    /// Render as CSV with the row label in the first field
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("statistic,{}\n", self.columns.join(",")));
        for (label, cells) in &self.rows {
            let values: Vec<String> = cells.iter().map(|c| csv_field(&c.to_string())).collect();
            out.push_str(&format!("{},{}\n", csv_field(label), values.join(",")));
        }
        out
    }
}

fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_lookup() {
        let mut table = StatsTable::with_columns(vec!["1967".into(), "1968".into()]);
        table
            .push_row("Num_Newlines", vec![Cell::Count(3), Cell::Count(5)])
            .unwrap();

        assert_eq!(table.get("Num_Newlines", "1968"), Some(&Cell::Count(5)));
        assert_eq!(table.get("Num_Newlines", "1969"), None);
        assert_eq!(table.row_labels(), vec!["Num_Newlines"]);
    }

    #[test]
    fn rejects_wrong_cell_count() {
        let mut table = StatsTable::with_columns(vec!["1967".into(), "1968".into()]);
        assert!(table.push_row("Short", vec![Cell::Count(1)]).is_err());
    }

    #[test]
    fn rejects_duplicate_row_label() {
        let mut table = StatsTable::with_columns(vec!["1967".into()]);
        table.push_row("Row", vec![Cell::Count(1)]).unwrap();
        assert!(table.push_row("Row", vec![Cell::Count(2)]).is_err());
    }

    #[test]
    fn csv_quotes_commas() {
        let mut table = StatsTable::with_columns(vec!["1967".into()]);
        table
            .push_row(
                "1_most_repeated_songs",
                vec![Cell::Entry("Respect, Aretha Franklin".into(), 9)],
            )
            .unwrap();
        let csv = table.to_csv();
        assert!(csv.contains("\"Respect, Aretha Franklin (9)\""));
    }
}

//! Normalized tabular container for whatever the market data platform returns.

use std::borrow::Cow;

use itertools::Itertools;
use serde_json::Value;

/// Column name for records that are not JSON objects.
const SCALAR_COLUMN: &str = "0";

#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriceTable {
    columns: Vec<String>,

    /// Every row holds exactly `columns.len()` cells.
    rows: Vec<Vec<Value>>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
#[display("({rows}, {columns})")]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

impl PriceTable {
    /// Build the table from a list of records.
    ///
    /// Object keys become columns in first-seen order. Anything else lands in the `0` column.
    pub fn from_records(records: Vec<Value>) -> Self {
        let columns: Vec<String> = records
            .iter()
            .flat_map(|record| match record {
                Value::Object(fields) => fields.keys().cloned().collect_vec(),
                _ => vec![SCALAR_COLUMN.to_owned()],
            })
            .unique()
            .collect();
        let rows = records
            .into_iter()
            .map(|record| match record {
                Value::Object(mut fields) => columns
                    .iter()
                    .map(|column| fields.remove(column).unwrap_or(Value::Null))
                    .collect(),
                scalar => {
                    let mut row = vec![Value::Null; columns.len()];
                    if let Some(index) = columns.iter().position(|column| column == SCALAR_COLUMN) {
                        row[index] = scalar;
                    }
                    row
                }
            })
            .collect();
        Self { columns, rows }
    }

    pub const fn shape(&self) -> Shape {
        Shape { rows: self.rows.len(), columns: self.columns.len() }
    }

    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// First `n` rows, for previews.
    #[must_use]
    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Replace every cell of the column, if the column exists.
    pub fn map_column(&mut self, name: &str, f: impl Fn(Value) -> Value) {
        let Some(index) = self.column_index(name) else {
            return;
        };
        for row in &mut self.rows {
            row[index] = f(row[index].take());
        }
    }

    /// Stable sort of the rows by the text of the column, if the column exists.
    pub fn sort_by_column(&mut self, name: &str) {
        if let Some(index) = self.column_index(name) {
            self.rows.sort_by(|lhs, rhs| cell_text(&lhs[index]).cmp(&cell_text(&rhs[index])));
        }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Plain-text rendering of a cell: strings without quotes and `null` as nothing.
#[must_use]
pub fn cell_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}

//! Columnar feature table keyed by bar timestamp.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

/// Name of the label column emitted by the builder.
pub const TARGET_COLUMN: &str = "target";

/// Ordered, named `f64` columns sharing one timestamp index.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    timestamps: Vec<DateTime<Utc>>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        names: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self, TableError> {
        if names.len() != columns.len() {
            return Err(TableError::ColumnCountMismatch {
                names: names.len(),
                columns: columns.len(),
            });
        }
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != timestamps.len() {
                return Err(TableError::LengthMismatch {
                    column: name.clone(),
                    expected: timestamps.len(),
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            timestamps,
            names,
            columns,
        })
    }

    /// Build from parts the caller has already made consistent.
    pub(crate) fn assemble(
        timestamps: Vec<DateTime<Utc>>,
        names: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(names.len(), columns.len());
        debug_assert!(columns.iter().all(|c| c.len() == timestamps.len()));
        Self {
            timestamps,
            names,
            columns,
        }
    }

    /// Zero-row table with the given column layout.
    pub fn empty(names: Vec<String>) -> Self {
        let columns = vec![Vec::new(); names.len()];
        Self {
            timestamps: Vec::new(),
            names,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.column_index(name).map(|i| self.columns[i].as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    pub fn row(&self, index: usize) -> Option<FeatureRow<'_>> {
        (index < self.len()).then_some(FeatureRow { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = FeatureRow<'_>> {
        (0..self.len()).map(move |index| FeatureRow { table: self, index })
    }

    /// Drop every row holding a non-finite value in any column.
    pub fn drop_incomplete_rows(self) -> Self {
        let keep: Vec<bool> = (0..self.len())
            .map(|i| self.columns.iter().all(|c| c[i].is_finite()))
            .collect();
        let timestamps = self
            .timestamps
            .into_iter()
            .zip(&keep)
            .filter_map(|(t, &k)| k.then_some(t))
            .collect();
        let columns = self
            .columns
            .into_iter()
            .map(|values| {
                values
                    .into_iter()
                    .zip(&keep)
                    .filter_map(|(v, &k)| k.then_some(v))
                    .collect()
            })
            .collect();
        Self {
            timestamps,
            names: self.names,
            columns,
        }
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    table: &'a FeatureTable,
    index: usize,
}

impl<'a> FeatureRow<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.table.timestamps[self.index]
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.table.column(name).map(|c| c[self.index])
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = f64> + 'a {
        let (table, index) = (self.table, self.index);
        table.columns.iter().map(move |c| c[index])
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("{names} column names for {columns} columns")]
    ColumnCountMismatch { names: usize, columns: usize },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Pivot tables with mean aggregation. Rows and columns come out sorted and
//! only pairs which received at least one value hold a cell.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy, Debug, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn get(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// An aggregated value with an optional symmetric error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub value: f64,
    pub error: Option<f64>,
}

pub struct PivotBuilder<R> {
    cells: BTreeMap<R, BTreeMap<String, (Mean, Mean)>>,
}

impl<R: Ord + Clone> Default for PivotBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Ord + Clone> PivotBuilder<R> {
    pub fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, row: R, column: &str, value: f64, error: Option<f64>) {
        let (v, e) = self
            .cells
            .entry(row)
            .or_insert_with(BTreeMap::new)
            .entry(column.to_string())
            .or_insert_with(Default::default);
        v.add(Some(value));
        e.add(error);
    }

    pub fn build(self) -> Pivot<R> {
        let columns: Vec<String> = self
            .cells
            .values()
            .flat_map(|c| c.keys().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        let mut rows = Vec::with_capacity(self.cells.len());
        let mut cells = Vec::with_capacity(self.cells.len());
        for (row, values) in self.cells {
            rows.push(row);
            cells.push(
                columns
                    .iter()
                    .map(|column| {
                        values.get(column).and_then(|(v, e)| {
                            v.get().map(|value| Cell {
                                value,
                                error: e.get(),
                            })
                        })
                    })
                    .collect(),
            );
        }

        Pivot {
            rows,
            columns,
            cells,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Pivot<R> {
    rows: Vec<R>,
    columns: Vec<String>,
    cells: Vec<Vec<Option<Cell>>>,
}

impl<R: Ord + Clone> Pivot<R> {
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: &R, column: &str) -> Option<Cell> {
        let r = self.rows.binary_search(row).ok()?;
        let c = self.columns.iter().position(|v| v == column)?;
        self.cells[r][c]
    }

    /// Values of one column laid out along `rows`, which need not be the
    /// pivot's own rows.
    pub fn series(&self, column: &str, rows: &[R]) -> Vec<Option<Cell>> {
        rows.iter().map(|row| self.get(row, column)).collect()
    }
}

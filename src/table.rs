// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Result tables as written by the benchmark harness: one CSV row per
//! `(Test, target req/s, req len)` with free-form result columns.

use crate::PlotError;

use csv::ReaderBuilder;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

pub const TEST: &str = "Test";
pub const RATE: &str = "target req/s";
pub const LENGTH: &str = "req len";
pub const BRANCH: &str = "branch";

pub const KEY_COLUMNS: [&str; 3] = [TEST, RATE, LENGTH];

/// A union of result rows. Column names are stored trimmed, cells verbatim.
#[derive(Clone, Debug, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PlotError> {
        let path = path.as_ref();
        debug!("loading results from: {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads a CSV with a header row. All three key columns must be present.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PlotError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        for key in KEY_COLUMNS.iter() {
            if !columns.iter().any(|c| c == key) {
                return Err(PlotError::MissingColumn(key.to_string()));
            }
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > columns.len() {
                return Err(PlotError::Fields {
                    row: index,
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }

        Ok(Self { columns, rows })
    }

    /// Concatenates tables. Columns are the union in order of first
    /// appearance; a row gets an empty cell for a column its table lacks.
    pub fn concat(tables: Vec<Table>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut rows = Vec::new();
        for table in tables {
            let mapping: Vec<Option<usize>> = columns
                .iter()
                .map(|c| table.columns.iter().position(|t| t == c))
                .collect();
            for row in table.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|idx| {
                            idx.and_then(|i| row.get(i).cloned())
                                .unwrap_or_default()
                        })
                        .collect(),
                );
            }
        }

        Self { columns, rows }
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

    /// Index of a column, matched on the trimmed name.
    pub fn column(&self, name: &str) -> Result<usize, PlotError> {
        let name = name.trim();
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PlotError::MissingColumn(name.to_string()))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(move |(index, cells)| Row {
            table: self,
            index,
            cells,
        })
    }

    /// The number of distinct `(Test, target req/s, req len)` keys.
    pub fn distinct_keys(&self) -> Result<usize, PlotError> {
        let mut keys = BTreeSet::new();
        for row in self.rows() {
            if let Some(key) = row.key()? {
                keys.insert(key);
            }
        }
        Ok(keys.len())
    }
}

pub struct Row<'a> {
    table: &'a Table,
    index: usize,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Position of the row in the concatenated table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The verbatim cell content. Short rows read as empty.
    pub fn text(&self, column: usize) -> &'a str {
        self.cells.get(column).map(|v| v.as_str()).unwrap_or("")
    }

    /// Parses a numeric cell. Empty cells and `NaN` are missing values.
    pub fn number(&self, column: usize) -> Result<Option<f64>, PlotError> {
        let value = self.text(column).trim();
        if value.is_empty() || value.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }
        match value.parse::<f64>() {
            Ok(v) if v.is_nan() => Ok(None),
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(PlotError::Parse {
                column: self.table.columns[column].clone(),
                row: self.index,
                value: value.to_string(),
            }),
        }
    }

    /// A numeric cell if it is strictly positive.
    pub fn positive(&self, column: usize) -> Result<Option<f64>, PlotError> {
        Ok(self.number(column)?.filter(|v| *v > 0.0))
    }

    /// The row key, or `None` if any key field is empty.
    pub fn key(&self) -> Result<Option<Key>, PlotError> {
        let test = Field::parse(self.text(self.table.column(TEST)?));
        let rate = Field::parse(self.text(self.table.column(RATE)?));
        let length = Field::parse(self.text(self.table.column(LENGTH)?));
        Ok(match (test, rate, length) {
            (Some(test), Some(rate), Some(length)) => Some(Key { test, rate, length }),
            _ => None,
        })
    }
}

/// A key cell: numeric when it parses as a number, text otherwise.
#[derive(Clone, Debug)]
pub enum Field {
    Number(f64),
    Text(String),
}

impl Field {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        match value.parse::<f64>() {
            Ok(v) if !v.is_nan() => Some(Field::Number(v)),
            Ok(_) => None,
            Err(_) => Some(Field::Text(value.to_string())),
        }
    }
}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Field::Number(a), Field::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Field::Number(_), Field::Text(_)) => Ordering::Less,
            (Field::Text(_), Field::Number(_)) => Ordering::Greater,
            (Field::Text(a), Field::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Field {}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Field::Number(v) => write!(f, "{}", v),
            Field::Text(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    pub test: Field,
    pub rate: Field,
    pub length: Field,
}

impl Key {
    /// Axis label, one line per key field.
    pub fn label(&self) -> Vec<String> {
        vec![
            self.test.to_string(),
            format!("{} req/s", self.rate),
            format!("{} B", self.length),
        ]
    }
}

// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{0}")]
    Args(String),
    #[error("missing column: {0:?}")]
    MissingColumn(String),
    #[error("column {column:?} row {row}: not a number: {value:?}")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },
    #[error("row {row}: expected {expected} fields, saw {found}")]
    Fields {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("no data to plot: {0}")]
    NoData(String),
    #[error("failed to load font")]
    Font,
    #[error("drawing error: {0}")]
    Drawing(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Drawing(e.to_string())
    }
}

impl From<clap::Error> for PlotError {
    fn from(e: clap::Error) -> Self {
        PlotError::Args(e.message)
    }
}
